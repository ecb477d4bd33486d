//! Copy a packaged resource file into place

use super::diff_summary;
use anyhow::{Context, Result};
use changestore::{Store, write_preserving_mode};
use std::fs;
use std::io;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Whole-file copy with snapshot-based reversal
#[derive(Debug, Clone)]
pub struct CopyFile {
    /// Source file, usually an [`Installer::resource`](crate::Installer::resource) path
    pub src: PathBuf,
    pub dest: PathBuf,
    pub store: Store,
}

impl CopyFile {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>, store: &Store) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            store: store.clone(),
        }
    }

    fn dest(&self) -> PathBuf {
        crate::paths::expand_path(&self.dest)
    }

    fn read_src(&self) -> Result<Vec<u8>> {
        let src = crate::paths::expand_path(&self.src);
        fs::read(&src).with_context(|| format!("Could not read source file {}", src.display()))
    }
}

impl Module for CopyFile {
    fn id(&self) -> String {
        format!("CopyFile: {} => {}", self.src.display(), self.dest.display())
    }

    fn files(&self) -> Vec<PathBuf> {
        vec![self.src.clone()]
    }

    fn status(&self) -> Result<Probe> {
        let src = self.read_src()?;
        let dest = match fs::read(self.dest()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Probe::fail("Destination file does not exist."));
            }
            Err(e) => return Err(e).context("Could not read destination file."),
        };

        if src == dest {
            return Ok(Probe::pass("File has been copied."));
        }
        let detail = match (std::str::from_utf8(&dest), std::str::from_utf8(&src)) {
            (Ok(current), Ok(wanted)) => format!(" ({})", diff_summary(current, wanted)),
            _ => String::new(),
        };
        Ok(Probe::fail(format!("File has not been copied{detail}.")))
    }

    fn install(&self) -> Result<String> {
        let content = self.read_src()?;
        let dest = self.dest();
        self.store
            .save_file(&dest, "")
            .context("Could not save snapshot to the store.")?;
        write_preserving_mode(&dest, &content)
            .with_context(|| format!("Could not write destination file {}", dest.display()))?;
        Ok("Successfully copied file.".into())
    }

    fn remove(&self) -> Result<String> {
        self.store
            .restore_file(self.dest(), "")
            .context("Failed to restore destination file.")?;
        Ok("Successfully restored destination file.".into())
    }
}
