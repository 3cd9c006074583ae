use std::collections::{BTreeMap, BTreeSet};

use crate::geom::{Centroid, EdgeVector};

/// A district under construction: its member blocks, running totals and the
/// edge state later trims start from.
#[derive(Clone, Debug)]
pub(crate) struct District {
    pub(crate) id: u32,
    pub(crate) branch_root: usize,                 // Watershed the district was carved from
    pub(crate) population: i64,
    pub(crate) centroid: Centroid,
    pub(crate) blocks: BTreeSet<usize>,
    pub(crate) edge_blocks: BTreeMap<usize, f64>,  // Member blocks on the open side, with scores
    pub(crate) vector: EdgeVector,
}

impl District {
    pub(crate) fn new(id: u32, branch_root: usize) -> Self {
        Self {
            id,
            branch_root,
            population: 0,
            centroid: Centroid::default(),
            blocks: BTreeSet::new(),
            edge_blocks: BTreeMap::new(),
            vector: EdgeVector::default(),
        }
    }
}
