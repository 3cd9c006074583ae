use std::{fs, io::Write, path::{Path, PathBuf}};

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Error unless the directory already exists.
pub(crate) fn require_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Directory does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// A file written to a temporary sibling and only moved to its final path on commit.
#[derive(Debug)]
pub(crate) struct StagedFile {
    file: NamedTempFile,
    path: PathBuf,
}

impl StagedFile {
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let dir = path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        Ok(Self { file, path: path.to_path_buf() })
    }

    #[inline] pub(crate) fn writer(&mut self) -> &mut NamedTempFile { &mut self.file }

    /// Flush and atomically rename into place.
    pub(crate) fn commit(mut self) -> Result<()> {
        self.file.flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        self.file.persist(&self.path)
            .with_context(|| format!("Failed to move output into {}", self.path.display()))?;
        Ok(())
    }
}
