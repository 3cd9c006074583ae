use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One district creation, in the order districts were carved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictEvent {
    pub district: u32,
    pub branch_root: i64,  // External id of the watershed the district was carved from
    pub population: i64,   // Population at creation time
}

/// Final state of one district.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistrictSummary {
    pub id: u32,
    pub branch_root: i64,
    pub population: i64,
    pub centroid: [f64; 2],
    pub area: f64,
    pub blocks: Vec<i64>,
}

/// The result of carving a region: block assignments plus per-district summaries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Plan {
    pub(crate) region: String,
    pub(crate) district_size: i64,
    pub(crate) total_population: i64,
    pub(crate) unassigned_population: i64,
    pub(crate) unassigned_blocks: usize,
    #[serde(skip)]
    pub(crate) assignments: BTreeMap<i64, u32>,  // Block id -> district id, assigned blocks only
    pub(crate) districts: Vec<DistrictSummary>,
    pub(crate) events: Vec<DistrictEvent>,
}

impl Plan {
    #[inline] pub fn region(&self) -> &str { &self.region }

    #[inline] pub fn district_size(&self) -> i64 { self.district_size }

    #[inline] pub fn total_population(&self) -> i64 { self.total_population }

    /// Population left without a district.
    #[inline] pub fn unassigned_population(&self) -> i64 { self.unassigned_population }

    #[inline] pub fn unassigned_blocks(&self) -> usize { self.unassigned_blocks }

    #[inline] pub fn num_districts(&self) -> usize { self.districts.len() }

    /// District of a block by external id; `None` when unassigned or unknown.
    #[inline] pub fn assignment(&self, block: i64) -> Option<u32> { self.assignments.get(&block).copied() }

    /// Every assigned block, ascending by block id.
    #[inline] pub fn assignments(&self) -> &BTreeMap<i64, u32> { &self.assignments }

    #[inline] pub fn districts(&self) -> &[DistrictSummary] { &self.districts }

    #[inline] pub fn events(&self) -> &[DistrictEvent] { &self.events }

    /// District populations in id order.
    pub fn populations(&self) -> Vec<i64> {
        self.districts.iter().map(|d| d.population).collect()
    }
}
