//! Command history and the interactive `rerun` prompt

use crate::paths;
use anyhow::{Context, Result, bail};
use dialoguer::{Input, Select};
use std::fs;
use std::path::Path;

/// Maximum number of remembered command lines
pub const MAX_ENTRIES: usize = 1000;

/// Load remembered command lines, newest first
pub fn load(state_dir: &Path) -> Vec<String> {
    let path = paths::history_file(state_dir);
    let Ok(text) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .take(MAX_ENTRIES)
        .map(str::to_string)
        .collect()
}

/// Prepend `line` to the history unless it repeats the newest entry
pub fn record(state_dir: &Path, line: &str) -> Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }

    let mut lines = load(state_dir);
    if lines.first().map(String::as_str) == Some(line) {
        return Ok(());
    }
    lines.insert(0, line.to_string());
    lines.truncate(MAX_ENTRIES);

    fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create {}", state_dir.display()))?;
    let path = paths::history_file(state_dir);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    log::debug!("Recorded history entry in {}", path.display());
    Ok(())
}

/// Let the user pick and edit a previous command line
pub fn prompt(state_dir: &Path) -> Result<String> {
    let lines = load(state_dir);
    if lines.is_empty() {
        bail!("No command history in {}", state_dir.display());
    }

    let choice = Select::new()
        .with_prompt("Previous commands")
        .items(&lines)
        .default(0)
        .interact()
        .context("Failed to read command selection")?;

    let line: String = Input::new()
        .with_prompt(">>>")
        .with_initial_text(lines[choice].clone())
        .interact_text()
        .context("Failed to read command line")?;

    Ok(line)
}
