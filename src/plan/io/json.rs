use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result, ensure};
use tracing::info;

use crate::{common::{StagedFile, ensure_dir_exists}, plan::Plan};

impl Plan {
    /// Stage the pretty-printed district summary for writing to `path`.
    pub(super) fn stage_summary_json(&self, path: &Path) -> Result<StagedFile> {
        let mut staged = StagedFile::create(path)?;
        serde_json::to_writer_pretty(staged.writer(), self)
            .with_context(|| format!("[plan::io] Failed to serialize plan for {}", self.region))?;
        Ok(staged)
    }

    /// Write the district summary to `path`.
    pub fn write_summary_json(&self, path: &Path) -> Result<()> {
        self.stage_summary_json(path)?.commit()
    }

    /// Write `<region>.assignments.csv` and `<region>.districts.json` into `dir`.
    ///
    /// Both files are fully written before either is moved into place. Existing
    /// outputs are only replaced when `force` is set.
    pub fn write_to_dir(&self, dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
        ensure_dir_exists(dir)?;
        let assignments_path = dir.join(format!("{}.assignments.csv", self.region));
        let summary_path = dir.join(format!("{}.districts.json", self.region));

        for path in [&assignments_path, &summary_path] {
            ensure!(force || !path.exists(),
                "[plan::io] {} already exists (use --force to overwrite)", path.display());
        }

        let staged = [self.stage_assignments_csv(&assignments_path)?, self.stage_summary_json(&summary_path)?];
        for file in staged { file.commit()? }

        info!(region = self.region.as_str(), dir = %dir.display(), "wrote plan");
        Ok(vec![assignments_path, summary_path])
    }

    /// Read back a summary written by [`Plan::write_summary_json`]. Assignments are
    /// rebuilt from the district member lists.
    pub fn read_summary_json(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[plan::io] Failed to read {}", path.display()))?;
        let mut plan: Self = serde_json::from_str(&text)
            .with_context(|| format!("[plan::io] Failed to parse {}", path.display()))?;
        plan.assignments = plan.districts.iter()
            .flat_map(|d| d.blocks.iter().map(move |&b| (b, d.id)))
            .collect();
        Ok(plan)
    }
}
