//! Module adapters - one idempotent, reversible change each
//!
//! Every type here implements [`tasktree::Module`]. Modules that rewrite
//! part of a file keep a reversing patch in the change store; modules that
//! replace a whole file keep a snapshot of the original.

mod apt;
mod block_in_file;
mod command;
mod copy_file;
mod dpkg;
mod file_mode;
mod http_get;
mod initd;
mod line_in_file;
mod mkdir;
mod template;
mod user;

pub use apt::Apt;
pub use block_in_file::BlockInFile;
pub use command::Command;
pub use copy_file::CopyFile;
pub use dpkg::Dpkg;
pub use file_mode::FileMode;
pub use http_get::HttpGet;
pub use initd::Initd;
pub use line_in_file::LineInFile;
pub use mkdir::Mkdir;
pub use template::Template;
pub use user::User;

use anyhow::{Context, Result};
use regex::Regex;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io;
use std::path::Path;

/// Read a text file; a missing file reads as `None`
pub(crate) fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
    }
}

/// Split file content into lines without a phantom trailing empty line
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n').map(str::to_string).collect()
}

/// Join lines back into file content, newline-terminated
pub(crate) fn join_lines(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Compile an optional regex; empty patterns yield `None`
pub(crate) fn compile(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }
    Regex::new(pattern)
        .map(Some)
        .with_context(|| format!("Invalid pattern {pattern:?}"))
}

/// Short "+added -removed lines" summary of how `current` differs from `wanted`
pub(crate) fn diff_summary(current: &str, wanted: &str) -> String {
    let diff = TextDiff::from_lines(current, wanted);
    let (mut added, mut removed) = (0usize, 0usize);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }
    format!("+{added} -{removed} lines")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_and_join_lines() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);

        assert_eq!(join_lines(&[]), "");
        assert_eq!(join_lines(&["a".into(), "b".into()]), "a\nb\n");
    }

    #[test]
    fn test_compile() {
        assert!(compile("").unwrap().is_none());
        assert!(compile("^X").unwrap().unwrap().is_match("X=1"));
        assert!(compile("(").is_err());
    }

    #[test]
    fn test_diff_summary() {
        assert_eq!(diff_summary("a\nb\n", "a\nc\nd\n"), "+2 -1 lines");
        assert_eq!(diff_summary("same\n", "same\n"), "+0 -0 lines");
    }

    #[test]
    fn test_read_text_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(read_text(&dir.path().join("nope")).unwrap().is_none());
    }
}
