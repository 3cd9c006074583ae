use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Tunables for a carving run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarveOptions {
    /// The root branch is treated as the final district once its remaining
    /// population drops below this multiple of the district size.
    pub last_district_factor: f64,
    /// Assert population conservation after every pass and district contiguity at the end.
    pub verify_invariants: bool,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self { last_district_factor: 1.5, verify_invariants: true }
    }
}

impl CarveOptions {
    /// Read options from a JSON file; missing fields keep their defaults.
    pub fn read_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[carve::options] Failed to open {}", path.display()))?;
        let options: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[carve::options] Failed to parse {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.last_district_factor.is_finite() && self.last_district_factor >= 1.0,
            "[carve::options] last_district_factor must be at least 1.0, got {}", self.last_district_factor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: CarveOptions = serde_json::from_str(r#"{"verify_invariants":false}"#).unwrap();
        assert_eq!(options.last_district_factor, 1.5);
        assert!(!options.verify_invariants);
    }

    #[test]
    fn rejects_unknown_fields_and_small_factors() {
        assert!(serde_json::from_str::<CarveOptions>(r#"{"seats":3}"#).is_err());
        let options = CarveOptions { last_district_factor: 0.5, ..Default::default() };
        assert!(options.validate().is_err());
    }
}
