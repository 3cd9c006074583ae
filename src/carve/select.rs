use tracing::debug;

use crate::carve::Carver;

/// A watershed whose children are still being examined.
struct Frame {
    node: usize,
    next_child: usize,
    all_under: bool,  // No child was large enough to descend into
    last: bool,
}

impl Carver<'_> {
    /// One pass over the tree: carve a district from every deepest open branch
    /// that still holds at least a district's worth of people.
    pub(super) fn carve_pass(&mut self) {
        let region = self.region;
        let size = self.size();
        let root = region.root();

        let last = (self.branch_population[root] as f64) < self.options.last_district_factor * size as f64;
        if self.closed[root] || (self.branch_population[root] < size && !last) { return }

        let mut stack = vec![Frame { node: root, next_child: 0, all_under: true, last }];
        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = region.children(frame.node).get(frame.next_child) {
                frame.next_child += 1;
                if !frame.last && !self.closed[child] && self.branch_population[child] >= size {
                    frame.all_under = false;
                    stack.push(Frame { node: child, next_child: 0, all_under: true, last: false });
                }
                continue;
            }

            let (node, all_under, last) = (frame.node, frame.all_under, frame.last);
            stack.pop();
            if all_under {
                self.seed_district(node, last);
            }
        }
    }

    /// Settle stranded territory around `branch`, then carve one district from it.
    fn seed_district(&mut self, branch: usize, last: bool) {
        let Some((branch, group)) = self.resolve_stranded(branch, last) else { return };
        self.close_watersheds(branch);
        debug!(
            branch = self.region.watershed(branch).id(),
            group_population = group.population,
            group_centroid = ?group.centroid.point(),
            last,
            "seeding district"
        );
        self.build_district(branch, last, &group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{carve::CarveOptions, region::testing::RegionBuilder};

    /// Root R (exit at x = 0) with child A holding blocks at x = 1..3 and
    /// child B holding a block at x = -1. Blocks chain 4-1-2-3.
    fn forked() -> crate::region::Region {
        RegionBuilder::new()
            .watershed(1, None, (0.0, 0.0))
            .watershed(2, Some(1), (0.5, 0.0))
            .watershed(3, Some(1), (-0.5, 0.0))
            .block(1, 2, 10, (1.0, 0.0))
            .block(2, 2, 10, (2.0, 0.0))
            .block(3, 2, 10, (3.0, 0.0))
            .block(4, 3, 10, (-1.0, 0.0))
            .chain(&[4, 1, 2, 3])
            .build(20)
    }

    #[test]
    fn descends_into_children_holding_a_full_district() {
        let region = forked();
        let mut carver = Carver::new(&region, &CarveOptions::default());

        carver.carve_pass();

        assert_eq!(carver.events.len(), 1);
        assert_eq!(carver.events[0].branch_root, 2);
        assert_eq!(carver.events[0].population, 20);
        assert_eq!(carver.district(1).blocks.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(carver.unassigned_population(), 20);
    }

    #[test]
    fn remainder_becomes_the_last_district() {
        let region = forked();
        let mut carver = Carver::new(&region, &CarveOptions::default());

        carver.run();

        assert_eq!(carver.num_districts(), 2);
        assert_eq!(carver.events[1].branch_root, 1);
        assert_eq!(carver.events[1].population, 20);
        assert_eq!(carver.unassigned_population(), 0);
    }
}
