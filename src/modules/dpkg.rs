//! Install a `.deb` file shipped with the installer

use super::apt::is_installed;
use crate::runner;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Package file installed with `dpkg -i`, or a package removed by name
///
/// The file is listed in `files()` so `build` packs it; pass a path from
/// [`Installer::resource`](crate::Installer::resource).
#[derive(Debug, Clone, Default)]
pub struct Dpkg {
    pub path: PathBuf,
    /// Package name, needed only with `absent`
    pub name: String,
    /// Install even when dependencies are missing
    pub force: bool,
    pub absent: bool,
}

impl Dpkg {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Ensure the named package is not installed
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            absent: true,
            ..Self::default()
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn path(&self) -> PathBuf {
        crate::paths::expand_path(&self.path)
    }

    /// Package name recorded in the `.deb` file
    fn package_name(&self) -> Result<String> {
        let path = self.path();
        let path = path.to_string_lossy();
        let (ok, output) =
            runner::run_combined("dpkg-deb", &["-W", "--showformat", "${Package}", &path])?;
        if !ok {
            bail!("Could not read package name from {path}: {output}");
        }
        Ok(output)
    }

    fn dpkg(args: &[&str]) -> Result<()> {
        let (ok, output) = runner::run_combined("dpkg", args)?;
        if !ok {
            bail!("dpkg {} failed: {output}", args.join(" "));
        }
        Ok(())
    }
}

impl Module for Dpkg {
    fn id(&self) -> String {
        if self.absent {
            format!("Dpkg remove {}", self.name)
        } else {
            format!("Dpkg install {}", self.path.display())
        }
    }

    fn files(&self) -> Vec<PathBuf> {
        if self.absent || self.path.as_os_str().is_empty() {
            Vec::new()
        } else {
            vec![self.path.clone()]
        }
    }

    fn status(&self) -> Result<Probe> {
        let name = if self.absent {
            self.name.clone()
        } else {
            self.package_name()
                .context("Couldn't get package name.")?
        };
        let (ok, output) = runner::run_combined("dpkg-query", &["-W", "-f", "${Status}", &name])?;
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
            Self::dpkg(&["-r", &self.name])?;
            return Ok("Removal was successful.".into());
        }
        let path = self.path();
        let path = path.to_string_lossy();
        if self.force {
            Self::dpkg(&["--force-depends", "-i", &path])?;
        } else {
            Self::dpkg(&["-i", &path])?;
        }
        Ok("Install was successful.".into())
    }

    fn remove(&self) -> Result<String> {
        if self.absent {
            return Ok("Cannot reinstall a removed package.".into());
        }
        let name = self.package_name().context("Couldn't get package name.")?;
        Self::dpkg(&["-r", &name])?;
        Ok("Removal was successful.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_and_id() {
        let pkg = Dpkg::new("/tmp/work/debs/tool_1.0_amd64.deb").force(true);
        assert_eq!(pkg.files(), vec![PathBuf::from("/tmp/work/debs/tool_1.0_amd64.deb")]);
        assert_eq!(pkg.id(), "Dpkg install /tmp/work/debs/tool_1.0_amd64.deb");

        let gone = Dpkg::absent("tool");
        assert!(gone.files().is_empty());
        assert_eq!(gone.id(), "Dpkg remove tool");
    }

    #[test]
    fn test_undoing_a_removal_does_nothing() {
        let gone = Dpkg::absent("tool");
        assert_eq!(gone.remove().unwrap(), "Cannot reinstall a removed package.");
    }

    #[test]
    fn test_missing_deb_fails_status() {
        let pkg = Dpkg::new("/nonexistent/genesis.deb");
        assert!(pkg.status().is_err());
    }
}
