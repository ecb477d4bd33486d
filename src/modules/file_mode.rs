//! Permission bits on an existing path, or its absence

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Not reversible: removing only reports that nothing was undone.
#[derive(Debug, Clone)]
pub struct FileMode {
    pub path: PathBuf,
    /// Permission bits, e.g. `0o755`
    pub mode: u32,
    /// Delete the path instead of setting its mode
    pub absent: bool,
}

impl FileMode {
    pub fn new(path: impl Into<PathBuf>, mode: u32) -> Self {
        Self {
            path: path.into(),
            mode,
            absent: false,
        }
    }

    /// Ensure the path does not exist
    pub fn absent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: 0,
            absent: true,
        }
    }

    fn path(&self) -> PathBuf {
        crate::paths::expand_path(&self.path)
    }
}

#[cfg(unix)]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

#[cfg(unix)]
fn set_mode(path: &std::path::Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &std::path::Path, _mode: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "file modes are only supported on unix",
    ))
}

impl Module for FileMode {
    fn id(&self) -> String {
        if self.absent {
            format!("file {} absent", self.path.display())
        } else {
            format!("file {} {:o}", self.path.display(), self.mode)
        }
    }

    fn describe(&self) -> String {
        if self.absent {
            format!("File: {} absent", self.path.display())
        } else {
            format!("File: {} mode={:o}", self.path.display(), self.mode)
        }
    }

    fn status(&self) -> Result<Probe> {
        let meta = match fs::symlink_metadata(self.path()) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(if self.absent {
                    Probe::pass("File does not exist.")
                } else {
                    Probe::fail("File does not exist.")
                });
            }
            Err(e) => return Err(e).context("Cannot stat file."),
        };

        if self.absent {
            return Ok(Probe::fail("File exists."));
        }
        let actual = mode_bits(&meta);
        if actual == self.mode {
            Ok(Probe::pass("File mode is correct."))
        } else {
            Ok(Probe::fail(format!(
                "File mode should be {:o}, but is {:o}.",
                self.mode, actual
            )))
        }
    }

    fn install(&self) -> Result<String> {
        let path = self.path();
        if self.absent {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            return Ok("Successfully removed file.".into());
        }
        set_mode(&path, self.mode)
            .with_context(|| format!("Cannot change permissions of {}", path.display()))?;
        Ok("Successfully changed permissions.".into())
    }

    fn remove(&self) -> Result<String> {
        Ok("Cannot undo a file operation.".into())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mode() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("script");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        set_mode(&file, 0o644).unwrap();

        let module = FileMode::new(&file, 0o755);
        let probe = module.status().unwrap();
        assert_eq!(probe.message, "File mode should be 755, but is 644.");

        module.install().unwrap();
        assert!(module.status().unwrap().status.is_pass());
        assert_eq!(module.remove().unwrap(), "Cannot undo a file operation.");
    }

    #[test]
    fn test_absent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("stale.pid");
        fs::write(&file, "123").unwrap();

        let module = FileMode::absent(&file);
        assert!(!module.status().unwrap().status.is_pass());
        module.install().unwrap();
        assert!(!file.exists());
        assert!(module.status().unwrap().status.is_pass());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let module = FileMode::new(dir.path().join("missing"), 0o600);
        assert!(!module.status().unwrap().status.is_pass());
        assert!(module.install().is_err());
    }
}
