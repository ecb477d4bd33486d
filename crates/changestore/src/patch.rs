//! Reverting text patches (latest delta wins)

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::{Store, write_preserving_mode};

impl Store {
    /// Record the patch that turns `new` back into `original` for `path`.
    ///
    /// Any patch previously stored under the same key is replaced.
    pub fn save_patch(
        &self,
        path: impl AsRef<Path>,
        original: &str,
        new: &str,
        label: &str,
    ) -> Result<()> {
        let path = path.as_ref();
        let Some(slot) = self.prepare_slot(path, label)? else {
            return Ok(());
        };

        let patch = diffy::create_patch(new, original);
        fs::write(&slot, patch.to_string()).map_err(|source| Error::Write {
            path: slot.clone(),
            source,
        })?;
        log::debug!("Saved patch for {} to {}", path.display(), slot.display());
        Ok(())
    }

    /// Revert `path` using the patch stored under `label`.
    ///
    /// The patch is applied exactly when it still matches; otherwise each
    /// change is applied where its lines are found now. A missing target,
    /// a missing or unreadable patch, and changes that no longer match are
    /// logged and leave the file untouched.
    pub fn apply_patch(&self, path: impl AsRef<Path>, label: &str) -> Result<()> {
        let path = path.as_ref();
        let Some(slot) = self.slot_path(path, label)? else {
            return Ok(());
        };

        let current = match fs::read_to_string(path) {
            Ok(current) => current,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Nothing to revert: {} does not exist", path.display());
                return Ok(());
            }
            Err(e) => {
                log::warn!("Cannot revert {}: {e}", path.display());
                return Ok(());
            }
        };

        let text = match fs::read_to_string(&slot) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("No usable patch at {}: {e}", slot.display());
                return Ok(());
            }
        };

        let patch = match diffy::Patch::from_str(&text) {
            Ok(patch) => patch,
            Err(e) => {
                log::warn!("Ignoring unreadable patch {}: {e}", slot.display());
                return Ok(());
            }
        };
        let reverted = match diffy::apply(&current, &patch) {
            Ok(reverted) => reverted,
            Err(e) => {
                log::debug!("Exact patch failed for {}: {e}", path.display());
                let (reverted, rejected) = apply_lenient(&current, &patch);
                if rejected > 0 {
                    log::warn!(
                        "{rejected} change(s) from {} no longer match {}; left as is",
                        slot.display(),
                        path.display()
                    );
                }
                reverted
            }
        };
        if reverted == current {
            return Ok(());
        }

        write_preserving_mode(path, reverted.as_bytes()).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Applied patch {} to {}", slot.display(), path.display());
        Ok(())
    }
}

/// One run of removed/added lines inside a hunk
#[derive(Debug, Default)]
struct Change<'p> {
    /// Zero-based position in the file the patch was made against
    at: usize,
    delete: Vec<&'p str>,
    insert: Vec<&'p str>,
    /// Context line right before the change
    before: Option<&'p str>,
    /// Context line right after the change
    after: Option<&'p str>,
}

impl Change<'_> {
    fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.insert.is_empty()
    }
}

fn changes<'p>(patch: &'p diffy::Patch<'p, str>) -> Vec<Change<'p>> {
    let mut out = Vec::new();
    for hunk in patch.hunks() {
        let mut pos = hunk.old_range().start().saturating_sub(1);
        let mut last_context = None;
        let mut pending = Change::default();
        for line in hunk.lines() {
            match line {
                diffy::Line::Context(text) => {
                    let text: &'p str = *text;
                    if !pending.is_empty() {
                        pending.after = Some(text);
                        out.push(std::mem::take(&mut pending));
                    }
                    last_context = Some(text);
                    pos += 1;
                }
                diffy::Line::Delete(text) => {
                    let text: &'p str = *text;
                    if pending.is_empty() {
                        pending.at = pos;
                        pending.before = last_context;
                    }
                    pending.delete.push(text);
                    pos += 1;
                }
                diffy::Line::Insert(text) => {
                    let text: &'p str = *text;
                    if pending.is_empty() {
                        pending.at = pos;
                        pending.before = last_context;
                    }
                    pending.insert.push(text);
                }
            }
        }
        if !pending.is_empty() {
            out.push(pending);
        }
    }
    out
}

fn same_line(a: &str, b: &str) -> bool {
    a.strip_suffix('\n').unwrap_or(a) == b.strip_suffix('\n').unwrap_or(b)
}

/// Start of the occurrence of `needle` closest to `expected`
fn nearest(lines: &[String], needle: &[&str], expected: usize) -> Option<usize> {
    if needle.len() > lines.len() {
        return None;
    }
    (0..=lines.len() - needle.len())
        .filter(|&i| {
            lines[i..i + needle.len()]
                .iter()
                .zip(needle)
                .all(|(line, want)| same_line(line, want))
        })
        .min_by_key(|&i| i.abs_diff(expected))
}

/// Apply each change where its removed lines (or its anchor) are found now
///
/// Changes that cannot be located are skipped. Returns the new text and
/// the number of skipped changes.
fn apply_lenient(current: &str, patch: &diffy::Patch<'_, str>) -> (String, usize) {
    let mut lines: Vec<String> = current.split_inclusive('\n').map(str::to_string).collect();
    let mut offset: isize = 0;
    let mut rejected = 0;

    for change in changes(patch) {
        let expected = change.at.saturating_add_signed(offset).min(lines.len());
        let start = if !change.delete.is_empty() {
            nearest(&lines, &change.delete, expected)
        } else if let Some(before) = change.before {
            nearest(&lines, &[before], expected.saturating_sub(1)).map(|i| i + 1)
        } else if let Some(after) = change.after {
            nearest(&lines, &[after], expected)
        } else {
            Some(expected)
        };
        let Some(start) = start else {
            rejected += 1;
            continue;
        };
        lines.splice(
            start..start + change.delete.len(),
            change.insert.iter().map(|s| (*s).to_string()),
        );
        offset = start as isize - change.at as isize + change.insert.len() as isize
            - change.delete.len() as isize;
    }

    let last = lines.len().saturating_sub(1);
    for line in &mut lines[..last] {
        if !line.ends_with('\n') {
            line.push('\n');
        }
    }
    (lines.concat(), rejected)
}
