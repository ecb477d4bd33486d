//! Debian package management via `apt-get` and `dpkg-query`

use crate::runner;
use anyhow::{Result, bail};
use tasktree::{Module, Probe};

/// Install (or, with `absent`, uninstall) a package
///
/// Removing reverses whichever of the two was applied.
#[derive(Debug, Clone)]
pub struct Apt {
    pub package: String,
    pub absent: bool,
}

impl Apt {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            absent: false,
        }
    }

    pub fn absent(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            absent: true,
        }
    }

    fn apt_get(&self, action: &str) -> Result<()> {
        let (ok, output) = runner::run_combined(
            "apt-get",
            &["--yes", "--no-install-recommends", action, &self.package],
        )?;
        if !ok {
            bail!("apt-get {action} {} failed: {output}", self.package);
        }
        Ok(())
    }
}

/// Whether `dpkg-query -f '${Status}'` output means "installed"
pub(super) fn is_installed(status: &str) -> bool {
    status.split_whitespace().nth(2) == Some("installed")
}

impl Module for Apt {
    fn id(&self) -> String {
        if self.absent {
            format!("Apt remove {}", self.package)
        } else {
            format!("Apt install {}", self.package)
        }
    }

    fn status(&self) -> Result<Probe> {
        let (ok, output) =
            runner::run_combined("dpkg-query", &["-W", "-f", "${Status}", &self.package])?;
        // dpkg-query exits non-zero for packages it has never heard of.
        let installed = ok && is_installed(&output);
        Ok(match (installed, self.absent) {
            (true, false) => Probe::pass("Package is installed."),
            (true, true) => Probe::fail("Package is installed."),
            (false, true) => Probe::pass("Package is not installed."),
            (false, false) => Probe::fail("Package is not installed."),
        })
    }

    fn install(&self) -> Result<String> {
        if self.absent {
            self.apt_get("remove")?;
            Ok("Removal was successful.".into())
        } else {
            self.apt_get("install")?;
            Ok("Install was successful.".into())
        }
    }

    fn remove(&self) -> Result<String> {
        if self.absent {
            self.apt_get("install")?;
            Ok("Install was successful.".into())
        } else {
            self.apt_get("remove")?;
            Ok("Removal was successful.".into())
        }
    }
}
