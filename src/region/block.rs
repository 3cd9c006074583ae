use geo::Coord;
use serde::{Deserialize, Serialize};

/// One row of a block table, as read from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: i64,
    pub watershed: i64,
    pub population: i64,
    pub boundary: bool,
    pub x: f64,
    pub y: f64,
    pub area: f64,
}

/// The atomic unit of assignment.
#[derive(Clone, Debug)]
pub struct CensusBlock {
    pub(crate) id: i64,
    pub(crate) population: i64,
    pub(crate) boundary: bool,
    pub(crate) centroid: Coord<f64>,
    pub(crate) area: f64,
    pub(crate) watershed: usize,
}

impl CensusBlock {
    #[inline] pub fn id(&self) -> i64 { self.id }
    #[inline] pub fn population(&self) -> i64 { self.population }
    #[inline] pub fn is_boundary(&self) -> bool { self.boundary }
    #[inline] pub fn centroid(&self) -> Coord<f64> { self.centroid }
    #[inline] pub fn area(&self) -> f64 { self.area }

    /// Arena index of the owning watershed.
    #[inline] pub fn watershed(&self) -> usize { self.watershed }
}
