//! Create a directory tree

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Removing a `Mkdir` deletes the directory and everything in it.
#[derive(Debug, Clone)]
pub struct Mkdir {
    pub path: PathBuf,
}

impl Mkdir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn path(&self) -> PathBuf {
        crate::paths::expand_path(&self.path)
    }
}

impl Module for Mkdir {
    fn id(&self) -> String {
        format!("mkdir{}", self.path.display())
    }

    fn describe(&self) -> String {
        format!("Mkdir: {}", self.path.display())
    }

    fn status(&self) -> Result<Probe> {
        match fs::metadata(self.path()) {
            Ok(meta) if meta.is_dir() => Ok(Probe::pass("Directory exists.")),
            Ok(_) => Ok(Probe::fail("Path exists, but is not a directory.")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(Probe::fail("No such file or directory."))
            }
            Err(e) => Err(e).context("Cannot stat directory."),
        }
    }

    fn install(&self) -> Result<String> {
        let path = self.path();
        fs::create_dir_all(&path)
            .with_context(|| format!("Could not make directory {}", path.display()))?;
        Ok("Made directory.".into())
    }

    fn remove(&self) -> Result<String> {
        let path = self.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => Ok("Removed directory and all its contents.".into()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok("Directory already gone.".into()),
            Err(e) => Err(e).with_context(|| format!("Could not remove {}", path.display())),
        }
    }
}
