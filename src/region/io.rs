use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::{common::require_dir_exists, io::csv, region::{Region, RegionManifest}};

impl Region {
    /// Load a region directory holding `region.json`, `watersheds.csv`,
    /// `blocks.csv` and `adjacency.csv`.
    pub fn read_from_dir(dir: &Path) -> Result<Self> {
        require_dir_exists(dir)?;
        let manifest = RegionManifest::read_from_path(&dir.join("region.json"))?;

        let watersheds = csv::read_watersheds(&csv::read_csv(&dir.join("watersheds.csv"))?)
            .with_context(|| format!("[region::io] Invalid watershed table in {}", dir.display()))?;
        let blocks = csv::read_blocks(&csv::read_csv(&dir.join("blocks.csv"))?)
            .with_context(|| format!("[region::io] Invalid block table in {}", dir.display()))?;
        let adjacency = csv::read_adjacency(&csv::read_csv(&dir.join("adjacency.csv"))?)
            .with_context(|| format!("[region::io] Invalid adjacency table in {}", dir.display()))?;

        let region = Region::new(manifest.name.clone(), manifest.target()?, &watersheds, &blocks, &adjacency)
            .with_context(|| format!("[region::io] Failed to build region from {}", dir.display()))?;

        debug!(
            region = region.name(),
            watersheds = region.watersheds().len(),
            blocks = region.blocks().len(),
            district_size = region.district_size(),
            "loaded region"
        );
        Ok(region)
    }
}
