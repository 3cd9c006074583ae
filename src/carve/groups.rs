use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ahash::AHashSet;
use tracing::warn;

use crate::{carve::Carver, geom::Centroid};

/// A maximal connected set of blocks sharing one district (possibly 0) and,
/// when grouped by branch, one branch label.
#[derive(Clone, Debug, Default)]
pub(crate) struct BlockGroup {
    pub(crate) population: i64,
    pub(crate) centroid: Centroid,
    pub(crate) blocks: BTreeSet<usize>,
    pub(crate) neighbors: BTreeMap<u32, BTreeSet<usize>>,  // Bordering blocks keyed by their district
    pub(crate) stranded: bool,
}

impl BlockGroup {
    /// Whether the group touches unassigned territory outside itself.
    #[inline] pub(crate) fn is_connected(&self) -> bool { self.neighbors.contains_key(&0) }
}

/// Index of the most populous group; the first one found wins ties.
pub(crate) fn largest_group(groups: &[BlockGroup]) -> Option<usize> {
    groups.iter().enumerate()
        .fold(None, |best: Option<(usize, i64)>, (i, group)| match best {
            Some((_, population)) if population >= group.population => best,
            _ => Some((i, group.population)),
        })
        .map(|(i, _)| i)
}

/// Mark groups without access to open territory as stranded and return how many are.
///
/// When no group is connected, the largest one is treated as connected so the
/// branch always keeps somewhere to grow.
pub(crate) fn classify_groups(groups: &mut [BlockGroup]) -> usize {
    let mut stranded = 0;
    for group in groups.iter_mut() {
        group.stranded = !group.is_connected();
        if group.stranded { stranded += 1 }
    }

    if stranded == groups.len() {
        if let Some(largest) = largest_group(groups) {
            groups[largest].stranded = false;
            stranded -= 1;
        }
    }
    stranded
}

impl Carver<'_> {
    /// Flood-fill the blocks reachable from `seeds` that belong to `district` and,
    /// when `branch` is given, to watersheds labelled with that branch.
    ///
    /// Seeds that do not qualify or were already reached are skipped, so groups
    /// come out in seed order.
    pub(super) fn collect_groups(
        &self,
        seeds: impl IntoIterator<Item = usize>,
        branch: Option<usize>,
        district: u32,
    ) -> Vec<BlockGroup> {
        let region = self.region;
        let qualifies = |block: usize| {
            self.assignments[block] == district
                && branch.is_none_or(|b| self.branch_root[region.block(block).watershed()] == Some(b))
        };

        let mut grouped = AHashSet::new();
        let mut groups = Vec::new();
        for seed in seeds {
            if grouped.contains(&seed) || !qualifies(seed) { continue }

            let mut group = BlockGroup::default();
            let mut queue = VecDeque::from([seed]);
            grouped.insert(seed);
            while let Some(block) = queue.pop_front() {
                let census = region.block(block);
                group.blocks.insert(block);
                group.population += census.population();
                group.centroid.add(census.centroid(), census.area());

                for neighbor in region.graph().edges(block) {
                    if grouped.contains(&neighbor) { continue }
                    if qualifies(neighbor) {
                        grouped.insert(neighbor);
                        queue.push_back(neighbor);
                    } else {
                        group.neighbors.entry(self.assignments[neighbor]).or_default().insert(neighbor);
                    }
                }
            }
            groups.push(group);
        }
        groups
    }

    /// Unassigned block groups of the open watersheds labelled with `branch`.
    pub(super) fn build_groups(&self, branch: usize) -> Vec<BlockGroup> {
        let region = self.region;
        let seeds = region
            .descend(branch, |ws| !self.closed[ws] && self.branch_root[ws] == Some(branch))
            .into_iter()
            .flat_map(|ws| region.watershed(ws).blocks().iter().copied());
        let groups = self.collect_groups(seeds, Some(branch), 0);
        if groups.is_empty() {
            warn!(region = region.name(), branch = region.watershed(branch).id(), "branch has no open block groups");
        }
        groups
    }
}
