//! Full-content snapshots (first write wins)

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::{Store, write_preserving_mode};

impl Store {
    /// Back up the current content of `path` under `label`.
    ///
    /// Does nothing when the file cannot be read (there is nothing to protect
    /// yet) or when a snapshot already exists for the key.
    pub fn save_file(&self, path: impl AsRef<Path>, label: &str) -> Result<()> {
        let path = path.as_ref();
        if !self.is_enabled() {
            return Ok(());
        }

        let Ok(contents) = fs::read(path) else {
            log::debug!("No snapshot for {}: file not readable", path.display());
            return Ok(());
        };

        let Some(slot) = self.prepare_slot(path, label)? else {
            return Ok(());
        };

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            if let Ok(meta) = fs::metadata(path) {
                options.mode(meta.permissions().mode() & 0o7777);
            }
        }

        let mut file = match options.open(&slot) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                log::debug!("Snapshot already present: {}", slot.display());
                return Ok(());
            }
            Err(source) => return Err(Error::Write { path: slot, source }),
        };

        file.write_all(&contents)
            .map_err(|source| Error::Write {
                path: slot.clone(),
                source,
            })?;
        log::debug!("Saved snapshot of {} to {}", path.display(), slot.display());
        Ok(())
    }

    /// Whether a snapshot (or patch) slot exists for `(path, label)`
    pub fn has_slot(&self, path: impl AsRef<Path>, label: &str) -> Result<bool> {
        Ok(self
            .slot_path(path, label)?
            .is_some_and(|slot| slot.exists()))
    }

    /// Put back the snapshot of `path` taken under `label`.
    ///
    /// With no snapshot the target did not exist before the first save, so it
    /// is deleted. An unreadable snapshot leaves the target untouched.
    pub fn restore_file(&self, path: impl AsRef<Path>, label: &str) -> Result<()> {
        let path = path.as_ref();
        let Some(slot) = self.slot_path(path, label)? else {
            return Ok(());
        };

        if !slot.exists() {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("Removed {} (no prior snapshot)", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Could not remove {}: {e}", path.display()),
            }
            return Ok(());
        }

        let contents = match fs::read(&slot) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("Snapshot {} unreadable, not restoring: {e}", slot.display());
                return Ok(());
            }
        };

        write_preserving_mode(path, &contents).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Restored {} from {}", path.display(), slot.display());
        Ok(())
    }
}
