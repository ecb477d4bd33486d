//! Facts discovered about the target machine
//!
//! Installers branch on these (for example with a [`tasktree::Switch`]) and
//! templates can render them. A fact that cannot be determined is left empty.

use crate::runner;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Where the distribution name is read from
const ISSUE_FILE: &str = "/etc/issue";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    /// Machine hardware name, as `uname -m` prints it
    pub arch: String,
    /// Architecture the binary was compiled for
    pub arch_type: String,
    pub os: String,
    pub hostname: String,
    pub username: String,
    /// First word of `/etc/issue`, e.g. `Ubuntu`
    pub distro: String,
}

impl Facts {
    pub fn gather() -> Self {
        let facts = Self {
            arch: runner::run_capture("uname", &["-m"]).unwrap_or_default(),
            arch_type: std::env::consts::ARCH.to_string(),
            os: std::env::consts::OS.to_string(),
            hostname: hostname(),
            username: username(),
            distro: distro(Path::new(ISSUE_FILE)),
        };
        log::debug!("Gathered facts: {facts:?}");
        facts
    }
}

fn hostname() -> String {
    if let Ok(name) = fs::read_to_string("/etc/hostname") {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    runner::run_capture("hostname", &[]).unwrap_or_default()
}

fn username() -> String {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .or_else(|| runner::run_capture("id", &["-un"]).ok())
        .unwrap_or_default()
}

fn distro(issue: &Path) -> String {
    fs::read_to_string(issue)
        .ok()
        .and_then(|text| text.split_whitespace().next().map(str::to_string))
        .unwrap_or_default()
}
