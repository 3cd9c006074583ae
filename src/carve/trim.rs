use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    carve::{Carver, largest_group},
    geom::{EdgeVector, argmax_by, argmin_by, distance},
};

impl Carver<'_> {
    /// Whether `block` touches unassigned land or a district carved after `district`.
    fn borders_open_or_later(&self, block: usize, district: u32) -> bool {
        self.region.graph().edges(block).any(|neighbor| {
            let owner = self.assignment(neighbor);
            owner == 0 || owner > district
        })
    }

    /// Shed blocks from the open side of an over-quota district until removing
    /// the next one would take it to or below the quota.
    pub(super) fn trim_district(&mut self, district: u32) {
        let region = self.region;
        let size = self.size();
        let mut vector = self.district(district).vector;
        let score = |vector: &EdgeVector, block: usize| vector.score(region.centroid(block));

        let mut prospects = self.district(district).edge_blocks.keys()
            .filter(|&&block| self.borders_open_or_later(block, district))
            .map(|&block| (block, score(&vector, block)))
            .collect::<BTreeMap<_, _>>();

        if prospects.is_empty() {
            if let Some(seed) = self.retreat_seed(district) {
                vector = self.retreat_vector(district, seed);
                prospects.insert(seed, score(&vector, seed));
            }
        }
        if prospects.is_empty() {
            warn!(region = region.name(), district, "no removal prospects for trimmed district");
        }

        let mut removed = 0;
        loop {
            let mut next = argmax_by(prospects.iter().map(|(&b, &s)| (b, s)));

            // A pivot that has swung past its own line is dropped for a straight edge.
            if let Some((block, _)) = next {
                if vector.pivot.is_some() && vector.perpendicular_distance(region.centroid(block)) < 0.0 {
                    vector.pivot = None;
                    for (&block, value) in prospects.iter_mut() { *value = score(&vector, block) }
                    next = argmax_by(prospects.iter().map(|(&b, &s)| (b, s)));
                }
            }

            let Some((block, _)) = next else { break };
            if self.district(district).population - region.block(block).population() <= size { break }

            self.unassign_block(block, None);
            prospects.remove(&block);
            removed += 1;
            for neighbor in region.graph().edges(block) {
                if self.assignments[neighbor] == district {
                    prospects.insert(neighbor, score(&vector, neighbor));
                }
            }
        }

        for block in self.evict_fragments(district) {
            prospects.remove(&block);
        }

        let trimmed = self.district_mut(district);
        trimmed.edge_blocks = prospects;
        trimmed.vector = vector;
        debug!(district, removed, population = trimmed.population, "trimmed district");
    }

    /// Member block nearest the branch-root outflow among those facing open or later land.
    fn retreat_seed(&self, district: u32) -> Option<usize> {
        let region = self.region;
        let exit = region.exit(self.district(district).branch_root);
        argmin_by(
            self.district(district).blocks.iter()
                .filter(|&&block| self.borders_open_or_later(block, district))
                .map(|&block| (block, distance(exit, region.centroid(block)))),
        )
        .map(|(block, _)| block)
    }

    /// Vector pointing from the branch root outflow towards the first ancestor
    /// outflow that has the whole district behind it.
    fn retreat_vector(&self, district: u32, seed: usize) -> EdgeVector {
        let region = self.region;
        let carved = self.district(district);
        let root_exit = region.exit(carved.branch_root);

        let mut target = region.parent(carved.branch_root);
        while let Some(ws) = target {
            let exit = region.exit(ws);
            let vector = EdgeVector::new(exit, exit - root_exit);
            if carved.blocks.iter().all(|&block| vector.score(region.centroid(block)) <= 0.0) {
                return vector;
            }
            target = region.parent(ws);
        }
        EdgeVector::new(root_exit, root_exit - region.centroid(seed))
    }

    /// Unassign every component of `district` except the most populous one.
    ///
    /// Returns the evicted blocks.
    pub(super) fn evict_fragments(&mut self, district: u32) -> Vec<usize> {
        let members = self.district(district).blocks.iter().copied().collect::<Vec<_>>();
        let components = self.collect_groups(members, None, district);
        if components.len() <= 1 { return Vec::new() }

        let keep = largest_group(&components);
        let evicted = components.iter().enumerate()
            .filter(|&(i, _)| Some(i) != keep)
            .flat_map(|(_, component)| component.blocks.iter().copied())
            .collect::<Vec<_>>();
        for &block in &evicted {
            self.unassign_block(block, None);
        }
        debug!(district, components = components.len(), evicted = evicted.len(), "evicted disconnected fragments");
        evicted
    }
}
