//! # changestore
//!
//! A directory-backed table of reversible file changes, keyed by
//! `(file path, label)`.
//!
//! Two strategies are offered, chosen by the kind of mutation a caller makes:
//!
//! - **Snapshots** ([`Store::save_file`] / [`Store::restore_file`]) for
//!   callers that overwrite a whole file. The first snapshot written for a key
//!   is never replaced, so it stays the true rollback baseline no matter how
//!   many times the file is rewritten afterwards.
//! - **Patches** ([`Store::save_patch`] / [`Store::apply_patch`]) for callers
//!   that edit part of a file. Each save replaces the previous patch for the
//!   key; only the latest reverting delta is kept.
//!
//! A [`Store::disabled`] store accepts every call and does nothing, so callers
//! never special-case a run without persisted state.
//!
//! ## Layout
//!
//! ```text
//! <root>/store/<absolute path of target>[.<label>]
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use changestore::Store;
//!
//! let store = Store::open("/var/lib/genesis")?;
//! store.save_file("/etc/motd", "")?;
//! std::fs::write("/etc/motd", "managed\n").unwrap();
//! store.restore_file("/etc/motd", "")?;
//! # Ok::<(), changestore::Error>(())
//! ```

pub mod error;
mod patch;
mod snapshot;

pub use error::{Error, Result};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Mode given to files the store creates when there is no prior mode to keep.
pub const DEFAULT_MODE: u32 = 0o644;

/// Name of the subdirectory holding slots below the state root.
pub const STORE_DIR: &str = "store";

/// Backup table for file changes.
///
/// Cloning is cheap; clones share the same directory.
#[derive(Debug, Clone, Default)]
pub struct Store {
    dir: Option<PathBuf>,
}

impl Store {
    /// Open (creating if needed) the store below `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join(STORE_DIR);
        fs::create_dir_all(&dir).map_err(|source| Error::CreateDir {
            path: dir.clone(),
            source,
        })?;
        log::debug!("Opened change store at {}", dir.display());
        Ok(Self { dir: Some(dir) })
    }

    /// A store that records nothing and reverts nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Whether this store persists anything
    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    /// Directory holding the slots, if enabled
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Location of the slot for `(path, label)`.
    ///
    /// Returns `Ok(None)` for a disabled store. The location depends only on
    /// the absolute target path and the label.
    pub fn slot_path(&self, path: impl AsRef<Path>, label: &str) -> Result<Option<PathBuf>> {
        let Some(dir) = &self.dir else {
            return Ok(None);
        };
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|source| Error::Resolve {
            path: path.to_path_buf(),
            source,
        })?;

        let mut slot = dir.clone();
        let mut depth = 0usize;
        for component in absolute.components() {
            match component {
                Component::Normal(part) => {
                    slot.push(part);
                    depth += 1;
                }
                Component::ParentDir if depth > 0 => {
                    slot.pop();
                    depth -= 1;
                }
                _ => {}
            }
        }

        if !label.is_empty() {
            let mut name = slot.into_os_string();
            name.push(".");
            name.push(label);
            slot = PathBuf::from(name);
        }
        Ok(Some(slot))
    }

    /// Slot location plus its parent directory created, for writers.
    fn prepare_slot(&self, path: &Path, label: &str) -> Result<Option<PathBuf>> {
        let Some(slot) = self.slot_path(path, label)? else {
            return Ok(None);
        };
        if let Some(parent) = slot.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Ok(Some(slot))
    }
}

/// Write `contents` to `path`, keeping the current file mode when the file
/// exists and using [`DEFAULT_MODE`] otherwise.
pub fn write_preserving_mode(path: &Path, contents: &[u8]) -> io::Result<()> {
    let existing = fs::metadata(path).ok().map(|m| m.permissions());
    fs::write(path, contents)?;
    match existing {
        Some(permissions) => fs::set_permissions(path, permissions),
        None => set_default_mode(path),
    }
}

#[cfg(unix)]
fn set_default_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(DEFAULT_MODE))
}

#[cfg(not(unix))]
fn set_default_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_store_dir() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).unwrap();
        assert!(store.is_enabled());
        assert!(root.path().join(STORE_DIR).is_dir());
    }

    #[test]
    fn test_slot_path_mirrors_target() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).unwrap();

        let slot = store.slot_path("/etc/network/interfaces", "").unwrap().unwrap();
        assert_eq!(
            slot,
            root.path().join("store").join("etc").join("network").join("interfaces")
        );

        let labeled = store
            .slot_path("/etc/network/interfaces", "auto_eth1")
            .unwrap()
            .unwrap();
        assert_eq!(
            labeled,
            root.path()
                .join("store")
                .join("etc")
                .join("network")
                .join("interfaces.auto_eth1")
        );
    }

    #[test]
    fn test_slot_path_stays_inside_store() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).unwrap();
        let slot = store.slot_path("/../../etc/passwd", "").unwrap().unwrap();
        assert!(slot.starts_with(root.path().join(STORE_DIR)));
    }

    #[test]
    fn test_disabled_store_has_no_slots() {
        let store = Store::disabled();
        assert!(!store.is_enabled());
        assert!(store.slot_path("/etc/hosts", "x").unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_preserving_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fresh = dir.path().join("fresh");
        write_preserving_mode(&fresh, b"a").unwrap();
        assert_eq!(
            fs::metadata(&fresh).unwrap().permissions().mode() & 0o777,
            DEFAULT_MODE
        );

        let exec = dir.path().join("exec");
        fs::write(&exec, b"old").unwrap();
        fs::set_permissions(&exec, fs::Permissions::from_mode(0o755)).unwrap();
        write_preserving_mode(&exec, b"new").unwrap();
        assert_eq!(fs::metadata(&exec).unwrap().permissions().mode() & 0o777, 0o755);
        assert_eq!(fs::read(&exec).unwrap(), b"new");
    }
}
