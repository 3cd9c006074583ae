mod block;
mod io;
mod manifest;
mod region;
mod watershed;

#[cfg(test)]
pub(crate) mod testing;

pub use block::{BlockRecord, CensusBlock};
pub use manifest::{RegionManifest, TargetSize};
pub use region::Region;
pub use watershed::{Watershed, WatershedRecord};
