//! Sequential district carving over a watershed tree.

mod build;
mod carver;
mod district;
mod groups;
mod ledger;
mod options;
mod select;
mod snap;
mod trim;

pub(crate) use carver::Carver;
pub(crate) use district::District;
pub(crate) use groups::{BlockGroup, classify_groups, largest_group};
pub use options::CarveOptions;

use rayon::prelude::*;
use tracing::info;

use crate::{plan::Plan, region::Region};

/// Carve one region into districts.
pub fn carve(region: &Region, options: &CarveOptions) -> Plan {
    let mut carver = Carver::new(region, options);
    carver.run();
    let plan = carver.into_plan();
    info!(
        region = plan.region(),
        districts = plan.num_districts(),
        unassigned = plan.unassigned_population(),
        "finished carving"
    );
    plan
}

/// Carve independent regions in parallel; plans come back in input order.
pub fn carve_regions(regions: &[Region], options: &CarveOptions) -> Vec<Plan> {
    regions.par_iter().map(|region| carve(region, options)).collect()
}
