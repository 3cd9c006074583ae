use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::{
    carve::{BlockGroup, Carver, classify_groups, largest_group},
    geom::{argmin_by, distance},
};

/// Lowest district above `current` that borders a stranded group.
fn next_snap_district(groups: &[BlockGroup], current: Option<u32>) -> Option<u32> {
    groups.iter()
        .filter(|group| group.stranded)
        .flat_map(|group| group.neighbors.keys().copied())
        .filter(|&d| d != 0 && current.is_none_or(|c| d > c))
        .min()
}

impl Carver<'_> {
    /// Absorb stranded territory of `branch` into neighbouring districts until
    /// every open group can still reach unassigned land, ascending to the parent
    /// while the largest group is too small for a district.
    ///
    /// Returns the branch to carve from and its largest open group.
    pub(super) fn resolve_stranded(&mut self, mut branch: usize, last: bool) -> Option<(usize, BlockGroup)> {
        let region = self.region;
        let mut snap = None;
        let mut advance_snap = true;

        loop {
            self.label_branch(branch);
            let (mut groups, stranded) = loop {
                let mut groups = self.build_groups(branch);
                let stranded = classify_groups(&mut groups);
                if advance_snap {
                    snap = next_snap_district(&groups, snap);
                    advance_snap = false;
                }
                let added = snap.map_or(0, |district| self.snap_into(&groups, district));
                if added == 0 { break (groups, stranded) }
            };

            if let Some(district) = snap {
                self.trim_district(district);
                advance_snap = true;
                continue;
            }

            let target = largest_group(&groups)?;
            if stranded > 0 {
                warn!(
                    region = region.name(),
                    branch = region.watershed(branch).id(),
                    stranded,
                    "stranded groups border no eligible district"
                );
            }

            if !last && groups[target].population < self.size() {
                if let Some(parent) = region.parent(branch) {
                    debug!(
                        from = region.watershed(branch).id(),
                        to = region.watershed(parent).id(),
                        population = groups[target].population,
                        "largest group too small, ascending"
                    );
                    branch = parent;
                    snap = None;
                    advance_snap = true;
                    continue;
                }
            }
            return Some((branch, groups.swap_remove(target)));
        }
    }

    /// Snap every stranded group bordering `district` into it; returns blocks added.
    fn snap_into(&mut self, groups: &[BlockGroup], district: u32) -> usize {
        groups.iter()
            .filter(|group| group.stranded && group.neighbors.contains_key(&district))
            .map(|group| self.snap_group(group, district))
            .sum()
    }

    /// Move the blocks of a stranded group that prefer `district` into it,
    /// growing outwards from the blocks that touch it.
    fn snap_group(&mut self, group: &BlockGroup, district: u32) -> usize {
        let region = self.region;

        let mut border_by_watershed: AHashMap<usize, Vec<usize>> = AHashMap::new();
        let mut eligible_border = Vec::new();
        for blocks in group.neighbors.range(district..).map(|(_, blocks)| blocks) {
            for &block in blocks {
                border_by_watershed.entry(region.block(block).watershed()).or_default().push(block);
                eligible_border.push(block);
            }
        }

        let mut preferred: AHashMap<usize, Option<u32>> = AHashMap::new();
        let mut candidates: BTreeMap<usize, bool> = BTreeMap::new();
        for &block in &group.blocks {
            let source = region.block(block).watershed();
            let choice = *preferred.entry(source).or_insert_with(|| {
                self.preferred_district(group, source, &border_by_watershed, &eligible_border)
            });
            if choice == Some(district) { candidates.insert(block, false); }
        }

        // Only candidates touching the district may move first.
        if let Some(touching) = group.neighbors.get(&district) {
            for &block in touching {
                for neighbor in region.graph().edges(block) {
                    if let Some(ready) = candidates.get_mut(&neighbor) { *ready = true }
                }
            }
        }

        let mut added = 0;
        loop {
            let ready = candidates.iter()
                .filter(|&(_, &ready)| ready)
                .map(|(&block, _)| block)
                .collect::<Vec<_>>();
            if ready.is_empty() { break }

            for block in ready {
                candidates.remove(&block);
                self.assign_block(block, district, None);
                added += 1;
                for neighbor in region.graph().edges(block) {
                    if let Some(ready) = candidates.get_mut(&neighbor) { *ready = true }
                    if group.neighbors.len() > 1 {
                        self.district_mut(district).edge_blocks.remove(&neighbor);
                    }
                }
            }
        }

        if added > 0 {
            debug!(district, added, group_blocks = group.blocks.len(), "snapped stranded blocks");
        }
        added
    }

    /// District a stranded block in watershed `source` should join: the owner of
    /// the border block nearest the outflow reached by climbing the tree through
    /// watersheds that either own nothing or overlap the group.
    fn preferred_district(
        &self,
        group: &BlockGroup,
        source: usize,
        border_by_watershed: &AHashMap<usize, Vec<usize>>,
        eligible_border: &[usize],
    ) -> Option<u32> {
        let region = self.region;
        let mut border = BTreeSet::new();
        let mut current = source;

        while let Some(parent) = region.parent(current) {
            if let Some(blocks) = border_by_watershed.get(&current) {
                border.extend(blocks.iter().copied());
            }
            let parent_blocks = region.watershed(parent).blocks();
            if !parent_blocks.is_empty() && !parent_blocks.iter().any(|b| group.blocks.contains(b)) {
                break;
            }
            current = parent;
        }

        if border.is_empty() {
            border.extend(eligible_border.iter().copied());
        }

        let exit = region.exit(current);
        argmin_by(border.iter().map(|&block| (block, distance(exit, region.centroid(block)))))
            .map(|(block, _)| self.assignments[block])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{carve::CarveOptions, region::testing::RegionBuilder};

    #[test]
    fn next_snap_skips_connected_groups_and_earlier_districts() {
        let mut stranded = BlockGroup { stranded: true, ..Default::default() };
        stranded.neighbors.insert(4, BTreeSet::new());
        stranded.neighbors.insert(2, BTreeSet::new());
        let mut open = BlockGroup::default();
        open.neighbors.insert(1, BTreeSet::new());
        let groups = [stranded, open];

        assert_eq!(next_snap_district(&groups, None), Some(2));
        assert_eq!(next_snap_district(&groups, Some(2)), Some(4));
        assert_eq!(next_snap_district(&groups, Some(4)), None);
    }

    /// Root R with children W1 and W2. District 3 (blocks 0,1,3,4) surrounds
    /// block 2; block 7 in W1 touches block 5 in W2, which leads on through
    /// block 6 to blocks 8 and 9 held by the earlier districts 1 and 2.
    #[test]
    fn enclosed_block_snaps_into_surrounding_district() {
        let region = RegionBuilder::new()
            .watershed(1, None, (0.0, 0.0))
            .watershed(2, Some(1), (1.0, 1.0))
            .watershed(3, Some(1), (10.0, 0.0))
            .block(0, 1, 10, (0.0, 0.0))
            .block(1, 1, 10, (1.0, 0.0))
            .block(2, 1, 10, (1.0, 1.0))
            .block(3, 1, 10, (2.0, 1.0))
            .block(4, 1, 10, (1.0, 2.0))
            .block(5, 3, 10, (9.0, 0.0))
            .block(6, 3, 10, (10.0, 0.0))
            .block(7, 2, 10, (8.0, 0.0))
            .block(8, 3, 10, (11.0, 0.0))
            .block(9, 3, 10, (12.0, 0.0))
            .link(2, 0).link(2, 1).link(2, 3).link(2, 4)
            .link(0, 1).link(1, 3).link(3, 4)
            .chain(&[7, 5, 6, 8, 9])
            .build(100);
        let mut carver = Carver::new(&region, &CarveOptions::default());
        for block in [8, 9] {
            let earlier = carver.open_district(2);
            carver.assign_block(block, earlier, None);
        }
        let district = carver.open_district(0);
        assert_eq!(district, 3);
        for block in [0, 1, 3, 4] { carver.assign_block(block, district, None) }
        carver.district_mut(district).edge_blocks.insert(4, 0.0);

        let (branch, group) = carver.resolve_stranded(0, true).unwrap();

        assert_eq!(carver.assignment(2), district);
        assert_eq!(carver.district(district).population, 50);
        assert_eq!(carver.district(1).population, 10);
        assert_eq!(carver.district(2).population, 10);
        assert_eq!(branch, 0);
        assert_eq!(group.blocks, BTreeSet::from([5, 6, 7]));
        assert_eq!(carver.unassigned_population(), 30);
        carver.verify_conservation();
    }

    /// Child A holds blocks 1 and 2, which only meet through block 3 in root R.
    fn split_child() -> crate::region::Region {
        RegionBuilder::new()
            .watershed(1, None, (0.0, -2.0))
            .watershed(2, Some(1), (0.0, -1.0))
            .block(1, 2, 10, (-1.0, 0.0))
            .block(2, 2, 10, (1.0, 0.0))
            .block(3, 1, 10, (0.0, 0.0))
            .chain(&[1, 3, 2])
            .build(20)
    }

    #[test]
    fn short_groups_ascend_to_the_parent_branch() {
        let region = split_child();
        let mut carver = Carver::new(&region, &CarveOptions::default());
        let child = region.watershed_index(2).unwrap();

        let (branch, group) = carver.resolve_stranded(child, false).unwrap();

        assert_eq!(branch, region.root());
        assert_eq!(group.population, 30);
        assert_eq!(group.blocks, BTreeSet::from([0, 1, 2]));
        assert_eq!(carver.branch_root[child], Some(region.root()));
        assert_eq!(carver.num_districts(), 0);
    }

    #[test]
    fn last_district_does_not_ascend() {
        let region = split_child();
        let mut carver = Carver::new(&region, &CarveOptions::default());
        let child = region.watershed_index(2).unwrap();

        let (branch, group) = carver.resolve_stranded(child, true).unwrap();

        assert_eq!(branch, child);
        assert_eq!(group.population, 10);
        assert_eq!(group.blocks, BTreeSet::from([0]));
    }
}
