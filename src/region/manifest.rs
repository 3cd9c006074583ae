use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

/// How the per-district population quota is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSize {
    /// Split the total population evenly over this many seats (rounded).
    Seats(u32),
    /// Use this population per district directly.
    Population(i64),
}

impl TargetSize {
    /// Resolve to a concrete district size for a region of `total_population`.
    pub fn resolve(self, total_population: i64) -> Result<i64> {
        let size = match self {
            TargetSize::Seats(seats) => {
                ensure!(seats > 0, "[region::manifest] seats must be positive");
                (total_population as f64 / seats as f64).round() as i64
            }
            TargetSize::Population(size) => size,
        };
        ensure!(size > 0, "[region::manifest] district size must be positive, got {size}");
        Ok(size)
    }
}

/// Contents of `region.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_size: Option<i64>,
}

impl RegionManifest {
    pub fn read_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[region::manifest] Failed to open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[region::manifest] Failed to parse {}", path.display()))
    }

    /// An explicit district size wins over a seat count.
    pub fn target(&self) -> Result<TargetSize> {
        match (self.district_size, self.seats) {
            (Some(size), _) => Ok(TargetSize::Population(size)),
            (None, Some(seats)) => Ok(TargetSize::Seats(seats)),
            (None, None) => bail!("[region::manifest] region '{}' needs either 'seats' or 'district_size'", self.name),
        }
    }
}
