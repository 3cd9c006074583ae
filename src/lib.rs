#![doc = "Districtor public API"]
mod carve;
mod common;
mod geom;
mod graph;
mod io;
mod plan;
mod region;

#[doc(inline)]
pub use carve::{CarveOptions, carve, carve_regions};

#[doc(inline)]
pub use geom::{EdgeVector, Rotation};

#[doc(inline)]
pub use plan::{DistrictEvent, DistrictSummary, Plan};

#[doc(inline)]
pub use region::{BlockRecord, CensusBlock, Region, RegionManifest, TargetSize, Watershed, WatershedRecord};
