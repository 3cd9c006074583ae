use geo::Coord;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One row of a watershed table, as read from disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WatershedRecord {
    pub id: i64,
    pub parent: Option<i64>,
    pub boundary: bool,
    pub x: f64,
    pub y: f64,
}

/// A node of the drainage-basin tree.
///
/// Indices (`parent`, `children`, `blocks`) refer to positions in the owning
/// [`crate::Region`] arena, not to external ids.
#[derive(Clone, Debug)]
pub struct Watershed {
    pub(crate) id: i64,
    pub(crate) parent: Option<usize>,
    pub(crate) children: SmallVec<[usize; 4]>,
    pub(crate) boundary: bool,
    pub(crate) exit: Coord<f64>,
    pub(crate) population: i64,
    pub(crate) blocks: Vec<usize>,
}

impl Watershed {
    #[inline] pub fn id(&self) -> i64 { self.id }

    #[inline] pub fn parent(&self) -> Option<usize> { self.parent }

    /// Children in their input order.
    #[inline] pub fn children(&self) -> &[usize] { &self.children }

    /// Whether this watershed lies on the outer edge of the region.
    #[inline] pub fn is_boundary(&self) -> bool { self.boundary }

    /// Outflow point of the watershed.
    #[inline] pub fn exit(&self) -> Coord<f64> { self.exit }

    /// Population of the blocks this watershed directly owns.
    #[inline] pub fn population(&self) -> i64 { self.population }

    /// Directly owned blocks, ascending.
    #[inline] pub fn blocks(&self) -> &[usize] { &self.blocks }
}
