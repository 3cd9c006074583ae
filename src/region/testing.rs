//! Compact region fixtures for unit tests.

use crate::region::{BlockRecord, Region, TargetSize, WatershedRecord};

#[derive(Default)]
pub(crate) struct RegionBuilder {
    watersheds: Vec<WatershedRecord>,
    blocks: Vec<BlockRecord>,
    adjacency: Vec<(i64, i64)>,
}

impl RegionBuilder {
    pub(crate) fn new() -> Self { Self::default() }

    pub(crate) fn watershed(mut self, id: i64, parent: Option<i64>, exit: (f64, f64)) -> Self {
        self.watersheds.push(WatershedRecord { id, parent, boundary: false, x: exit.0, y: exit.1 });
        self
    }

    pub(crate) fn boundary_watershed(mut self, id: i64, parent: Option<i64>, exit: (f64, f64)) -> Self {
        self.watersheds.push(WatershedRecord { id, parent, boundary: true, x: exit.0, y: exit.1 });
        self
    }

    pub(crate) fn block(mut self, id: i64, watershed: i64, population: i64, at: (f64, f64)) -> Self {
        self.blocks.push(BlockRecord { id, watershed, population, boundary: false, x: at.0, y: at.1, area: 1.0 });
        self
    }

    pub(crate) fn link(mut self, a: i64, b: i64) -> Self {
        self.adjacency.push((a, b));
        self
    }

    /// Link consecutive ids into a path.
    pub(crate) fn chain(mut self, ids: &[i64]) -> Self {
        self.adjacency.extend(ids.windows(2).map(|pair| (pair[0], pair[1])));
        self
    }

    pub(crate) fn build(self, district_size: i64) -> Region {
        Region::new("test", TargetSize::Population(district_size), &self.watersheds, &self.blocks, &self.adjacency)
            .unwrap()
    }
}
