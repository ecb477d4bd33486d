//! Ensure a contiguous block of lines is present in a text file

use super::{compile, join_lines, read_text, split_lines};
use anyhow::{Context, Result};
use changestore::{Store, write_preserving_mode};
use regex::Regex;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Block edit with patch-based reversal
///
/// The block spans from the first line matching `start` to the next line
/// (at or after it) matching `end`; an empty `end` means the block is just
/// the start line. Without a match the block is appended.
#[derive(Debug, Clone, Default)]
pub struct BlockInFile {
    pub file: PathBuf,
    pub start: String,
    pub end: String,
    pub lines: Vec<String>,
    /// Per-line patterns recognising an installed block; exact lines when empty
    pub success: Vec<String>,
    pub label: String,
    pub store: Store,
}

impl BlockInFile {
    pub fn new<I, S>(
        file: impl Into<PathBuf>,
        start: impl Into<String>,
        end: impl Into<String>,
        lines: I,
        store: &Store,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file: file.into(),
            start: start.into(),
            end: end.into(),
            lines: lines.into_iter().map(Into::into).collect(),
            store: store.clone(),
            ..Self::default()
        }
    }

    pub fn success<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.success = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn path(&self) -> PathBuf {
        crate::paths::expand_path(&self.file)
    }

    fn matchers(&self) -> Result<Vec<Regex>> {
        if self.success.is_empty() {
            self.lines
                .iter()
                .map(|l| Regex::new(&format!("^{}$", regex::escape(l))).context("Invalid block line"))
                .collect()
        } else {
            self.success
                .iter()
                .map(|p| Regex::new(p).with_context(|| format!("Invalid pattern {p:?}")))
                .collect()
        }
    }

    /// Index range of the existing block, if both ends are found
    fn locate(&self, lines: &[String]) -> Result<Option<(usize, usize)>> {
        let Some(start_re) = compile(&self.start)? else {
            return Ok(None);
        };
        let end_re = compile(&self.end)?;
        let Some(start) = lines.iter().position(|l| start_re.is_match(l)) else {
            return Ok(None);
        };
        let end = match end_re {
            None => Some(start),
            Some(re) => lines[start..]
                .iter()
                .position(|l| re.is_match(l))
                .map(|offset| start + offset),
        };
        Ok(end.map(|end| (start, end)))
    }
}

impl Module for BlockInFile {
    fn id(&self) -> String {
        format!(
            "blockInFile{}{}{}{}{}",
            self.file.display(),
            self.start,
            self.end,
            self.lines.concat(),
            self.label
        )
    }

    fn describe(&self) -> String {
        format!(
            "BlockInFile: {}, {} => {}, {}...",
            self.file.display(),
            self.start,
            self.end,
            self.lines.first().map_or("", String::as_str)
        )
    }

    fn status(&self) -> Result<Probe> {
        let Some(text) = read_text(&self.path())? else {
            return Ok(Probe::fail("File does not exist."));
        };
        let lines = split_lines(&text);
        let matchers = self.matchers()?;
        if matchers.is_empty() {
            return Ok(Probe::pass("Block is empty."));
        }

        let found = lines.windows(matchers.len()).any(|window| {
            window
                .iter()
                .zip(&matchers)
                .all(|(line, re)| re.is_match(line))
        });
        if found {
            Ok(Probe::pass("Block found in file."))
        } else {
            Ok(Probe::fail("Block not in file."))
        }
    }

    fn install(&self) -> Result<String> {
        let path = self.path();
        let original = read_text(&path)?.unwrap_or_default();
        let mut lines = split_lines(&original);

        match self.locate(&lines)? {
            Some((start, end)) => {
                lines.splice(start..=end, self.lines.iter().cloned());
            }
            None => lines.extend(self.lines.iter().cloned()),
        }

        let updated = join_lines(&lines);
        self.store
            .save_patch(&path, &original, &updated, &self.label)
            .context("Could not save patch to the store.")?;
        write_preserving_mode(&path, updated.as_bytes())
            .with_context(|| format!("Unable to write {}", path.display()))?;
        Ok("Wrote block to file.".into())
    }

    fn remove(&self) -> Result<String> {
        self.store
            .apply_patch(self.path(), &self.label)
            .context("Could not apply patch.")?;
        Ok("Patch applied.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const IFACE: [&str; 4] = [
        "iface eth1 inet static",
        "  address 10.1.10.2",
        "  netmask 255.255.255.0",
        "  gateway 10.1.10.1",
    ];

    fn setup(content: &str) -> (TempDir, PathBuf, Store) {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("interfaces");
        fs::write(&file, content).unwrap();
        let store = Store::open(dir.path().join("state")).unwrap();
        (dir, file, store)
    }

    #[test]
    fn test_appends_when_missing_and_reverts() {
        let original = "auto lo\niface lo inet loopback\n";
        let (_dir, file, store) = setup(original);
        let module = BlockInFile::new(&file, "^iface eth1", "", IFACE, &store).label("eth1");

        assert!(!module.status().unwrap().status.is_pass());
        module.install().unwrap();
        let text = fs::read_to_string(&file).unwrap();
        assert!(text.starts_with(original));
        assert!(text.ends_with("  gateway 10.1.10.1\n"));
        assert!(module.status().unwrap().status.is_pass());

        module.remove().unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), original);
    }

    #[test]
    fn test_replaces_existing_block() {
        let (_dir, file, store) = setup(
            "# begin\nold one\nold two\n# end\ntrailer\n",
        );
        let module = BlockInFile::new(&file, "^# begin", "^# end", ["# begin", "new", "# end"], &store);

        module.install().unwrap();
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "# begin\nnew\n# end\ntrailer\n"
        );
        assert!(module.status().unwrap().status.is_pass());
    }

    #[test]
    fn test_missing_end_appends() {
        let (_dir, file, store) = setup("# begin\nstuff\n");
        let module = BlockInFile::new(&file, "^# begin", "^# end", ["# begin", "x", "# end"], &store);

        module.install().unwrap();
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "# begin\nstuff\n# begin\nx\n# end\n"
        );
    }

    #[test]
    fn test_status_requires_contiguous_block() {
        let (_dir, file, store) = setup("a\nzzz\nb\n");
        let module = BlockInFile::new(&file, "^a", "^b", ["a", "b"], &store);
        assert!(!module.status().unwrap().status.is_pass());

        fs::write(&file, "x\na\nb\n").unwrap();
        assert!(module.status().unwrap().status.is_pass());
    }

    #[test]
    fn test_success_patterns() {
        let (_dir, file, store) = setup("key = 1\nother = 2\n");
        let module = BlockInFile::new(&file, "^key", "", ["key=1", "other=2"], &store)
            .success([r"^key\s*=\s*1", r"^other\s*=\s*2"]);
        assert!(module.status().unwrap().status.is_pass());
    }

    #[test]
    fn test_patch_saved_before_write() {
        let (dir, file, store) = setup("auto lo\n");
        let store_dir = dir.path().join("state").join(changestore::STORE_DIR);
        fs::remove_dir_all(&store_dir).unwrap();
        fs::write(&store_dir, "").unwrap();

        let module = BlockInFile::new(&file, "^iface eth1", "", IFACE, &store);
        assert!(module.install().is_err());
        assert_eq!(fs::read_to_string(&file).unwrap(), "auto lo\n");
    }

    #[test]
    fn test_missing_file_fails_status() {
        let dir = TempDir::new().unwrap();
        let module = BlockInFile::new(dir.path().join("nope"), "^a", "", ["a"], &Store::disabled());
        assert!(!module.status().unwrap().status.is_pass());
    }
}
