//! SysV init scripts

use crate::runner;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tasktree::{Module, Probe};

/// Directory holding init scripts
const INIT_DIR: &str = "/etc/init.d";

/// Enable and (re)start the service whose script is `/etc/init.d/<name>`
///
/// Removing stops it and disables it at boot.
#[derive(Debug, Clone)]
pub struct Initd {
    pub name: String,
}

impl Initd {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn script(&self) -> PathBuf {
        Path::new(INIT_DIR).join(&self.name)
    }

    fn run(cmd: &str, args: &[&str], what: &str) -> Result<()> {
        let (ok, output) = runner::run_combined(cmd, args)?;
        if !ok {
            bail!("{what}: {output}");
        }
        Ok(())
    }
}

/// Whether `service <name> status` output reports the service active
///
/// The third line reads like `   Active: active (running) since ...`.
fn is_active(output: &str) -> bool {
    output
        .lines()
        .nth(2)
        .and_then(|line| line.split_whitespace().nth(1))
        == Some("active")
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path)?.permissions().mode();
    fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o111))
}

#[cfg(not(unix))]
fn make_executable(path: &Path) -> std::io::Result<()> {
    fs::metadata(path).map(|_| ())
}

impl Module for Initd {
    fn id(&self) -> String {
        format!("initd{}", self.name)
    }

    fn describe(&self) -> String {
        format!("Initd: {}", self.name)
    }

    fn status(&self) -> Result<Probe> {
        let (ok, output) = runner::run_combined("service", &[&self.name, "status"])?;
        if ok && is_active(&output) {
            Ok(Probe::pass("Service is running."))
        } else {
            Ok(Probe::fail("Service is not running."))
        }
    }

    fn install(&self) -> Result<String> {
        let script = self.script();
        make_executable(&script)
            .with_context(|| format!("Unable to make {} executable", script.display()))?;
        Self::run("update-rc.d", &[&self.name, "defaults"], "Error running update-rc.d")?;
        Self::run("service", &[&self.name, "restart"], "Error restarting service")?;
        Ok("Successfully installed service.".into())
    }

    fn remove(&self) -> Result<String> {
        if let Err(e) = Self::run("service", &[&self.name, "stop"], "Error stopping service") {
            log::debug!("{e:#}");
        }
        Self::run("update-rc.d", &[&self.name, "disable"], "Error disabling service")?;
        Ok("Successfully removed service.".into())
    }
}
