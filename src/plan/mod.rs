mod io;
mod plan;

pub use plan::{DistrictEvent, DistrictSummary, Plan};
