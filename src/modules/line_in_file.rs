//! Ensure a single line is present in (or absent from) a text file

use super::{compile, join_lines, read_text, split_lines};
use anyhow::{Context, Result};
use changestore::{Store, write_preserving_mode};
use regex::Regex;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Line edit with patch-based reversal
///
/// - `pattern` selects the line to replace (exact match on `line` when empty)
/// - `success` overrides how an installed line is recognised
/// - `after` / `before` bound the region the line must live in
/// - `absent` removes every line matching `pattern` instead
#[derive(Debug, Clone, Default)]
pub struct LineInFile {
    pub file: PathBuf,
    pub line: String,
    pub pattern: String,
    pub success: String,
    pub before: String,
    pub after: String,
    pub absent: bool,
    /// Distinguishes several edits of the same file in the store
    pub label: String,
    pub store: Store,
}

impl LineInFile {
    pub fn new(file: impl Into<PathBuf>, line: impl Into<String>, store: &Store) -> Self {
        Self {
            file: file.into(),
            line: line.into(),
            store: store.clone(),
            ..Self::default()
        }
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn success(mut self, success: impl Into<String>) -> Self {
        self.success = success.into();
        self
    }

    pub fn before(mut self, before: impl Into<String>) -> Self {
        self.before = before.into();
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = after.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn absent(mut self, absent: bool) -> Self {
        self.absent = absent;
        self
    }

    fn path(&self) -> PathBuf {
        crate::paths::expand_path(&self.file)
    }

    /// Matcher for the line to replace or delete
    fn target(&self) -> Result<Matcher> {
        Ok(match compile(&self.pattern)? {
            Some(re) => Matcher::Regex(re),
            None => Matcher::Exact(self.line.clone()),
        })
    }

    /// Matcher recognising an installed line
    fn installed(&self) -> Result<Matcher> {
        Ok(match compile(&self.success)? {
            Some(re) => Matcher::Regex(re),
            None => Matcher::Exact(self.line.clone()),
        })
    }
}

enum Matcher {
    Exact(String),
    Regex(Regex),
}

impl Matcher {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == line,
            Self::Regex(re) => re.is_match(line),
        }
    }
}

fn hits(re: Option<&Regex>, line: &str) -> bool {
    re.is_some_and(|re| re.is_match(line))
}

impl Module for LineInFile {
    fn id(&self) -> String {
        format!(
            "lineInFile{}{}{}{}{}{}",
            self.file.display(),
            self.pattern,
            self.line,
            self.label,
            self.before,
            self.after
        )
    }

    fn describe(&self) -> String {
        format!(
            "LineInFile: {}, {}, {}",
            self.file.display(),
            self.pattern,
            self.line
        )
    }

    fn status(&self) -> Result<Probe> {
        let path = self.path();
        let Some(text) = read_text(&path)? else {
            return Ok(if self.absent {
                Probe::pass("File does not exist.")
            } else {
                Probe::fail("File does not exist.")
            });
        };
        let lines = split_lines(&text);

        if self.absent {
            let target = self.target()?;
            if lines.iter().any(|l| target.matches(l)) {
                return Ok(Probe::fail("Line is in file."));
            }
            return Ok(Probe::pass("Line is absent from file."));
        }

        let installed = self.installed()?;
        let after = compile(&self.after)?;
        let before = compile(&self.before)?;
        let mut in_region = after.is_none();
        for line in &lines {
            if in_region && installed.matches(line) {
                return Ok(Probe::pass("Line is in file."));
            }
            if hits(after.as_ref(), line) {
                in_region = true;
            }
            if hits(before.as_ref(), line) {
                break;
            }
        }
        Ok(Probe::fail("Line not in file."))
    }

    fn install(&self) -> Result<String> {
        let path = self.path();
        let original = read_text(&path)?.unwrap_or_default();
        let mut lines = split_lines(&original);
        let target = self.target()?;

        if self.absent {
            lines.retain(|l| !target.matches(l));
        } else {
            let after = compile(&self.after)?;
            let before = compile(&self.before)?;
            let mut in_region = after.is_none();
            let mut placed = false;
            for i in 0..lines.len() {
                if in_region && target.matches(&lines[i]) {
                    lines[i] = self.line.clone();
                    placed = true;
                    break;
                }
                if hits(after.as_ref(), &lines[i]) {
                    in_region = true;
                }
                if hits(before.as_ref(), &lines[i]) {
                    lines.insert(i, self.line.clone());
                    placed = true;
                    break;
                }
            }
            if !placed {
                lines.push(self.line.clone());
            }
        }

        let updated = join_lines(&lines);
        self.store
            .save_patch(&path, &original, &updated, &self.label)
            .context("Could not save patch to the store.")?;
        write_preserving_mode(&path, updated.as_bytes())
            .with_context(|| format!("Unable to write {}", path.display()))?;
        Ok(if self.absent {
            "Removed line from file.".into()
        } else {
            "Wrote line to file.".into()
        })
    }

    fn remove(&self) -> Result<String> {
        let path = self.path();
        self.store
            .apply_patch(&path, &self.label)
            .context("Could not apply patch.")?;
        Ok("Patch applied.".into())
    }
}
