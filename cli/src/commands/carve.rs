use anyhow::{Context, Result};
use districtor::{CarveOptions, Region, carve_regions};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CarveArgs) -> Result<()> {
    let options = match &args.config {
        Some(path) => CarveOptions::read_from_path(path)?,
        None => CarveOptions::default(),
    };

    let regions = args.regions.iter()
        .map(|dir| Region::read_from_dir(dir)
            .with_context(|| format!("[carve] failed to load region from {}", dir.display())))
        .collect::<Result<Vec<_>>>()?;
    info!(regions = regions.len(), "loaded regions");

    for plan in carve_regions(&regions, &options) {
        let written = plan.write_to_dir(&args.output, args.force)?;
        println!(
            "[carve] {}: {} districts, {} unassigned -> {}",
            plan.region(),
            plan.num_districts(),
            plan.unassigned_population(),
            written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
        );
    }

    Ok(())
}
