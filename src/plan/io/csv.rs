use std::path::Path;

use anyhow::Result;

use crate::{common::StagedFile, plan::Plan};

impl Plan {
    /// Stage `block,district` rows for writing to `path`.
    pub(super) fn stage_assignments_csv(&self, path: &Path) -> Result<StagedFile> {
        let mut df = crate::io::csv::assignments_frame(&self.assignments)?;
        let mut staged = StagedFile::create(path)?;
        crate::io::csv::write_csv(&mut df, staged.writer())?;
        Ok(staged)
    }

    /// Write the block assignment table to `path`.
    pub fn write_assignments_csv(&self, path: &Path) -> Result<()> {
        self.stage_assignments_csv(path)?.commit()
    }
}
