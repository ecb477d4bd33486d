//! Self-extracting executables
//!
//! `build` zips every resource file the installer references and appends
//! the archive to a copy of the executable. On startup `extract` unpacks
//! that archive into the run's working directory, so modules find their
//! resources at [`Installer::resource`](crate::Installer::resource) paths.

use crate::ui;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

/// Suffix appended to the executable name for the built installer
pub const OUTPUT_SUFFIX: &str = ".x";

/// Permission bits of the built installer
pub const OUTPUT_MODE: u32 = 0o755;

/// Resource paths relative to the working directory
///
/// Files outside the working directory are not packaged: they are expected
/// to exist on the target machine already.
pub fn resources(files: &[PathBuf], workdir: &Path) -> Vec<PathBuf> {
    let mut rel: Vec<PathBuf> = files
        .iter()
        .filter_map(|f| f.strip_prefix(workdir).ok())
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .collect();
    rel.sort();
    rel.dedup();
    rel
}

/// Build `<exe>.x`: the executable followed by a zip of the resources
///
/// Each resource is looked up in `dirs` in order (current directory when
/// empty). Resources that cannot be found are reported and left out.
pub fn build(files: &[PathBuf], workdir: &Path, dirs: &[PathBuf], exe: Option<&Path>) -> Result<PathBuf> {
    let exe = match exe {
        Some(path) => path.to_path_buf(),
        None => std::env::current_exe().context("Cannot locate own executable")?,
    };
    ui::header("Building the self-contained executable");

    let body = fs::read(&exe).with_context(|| format!("Cannot read executable {}", exe.display()))?;

    let default_dirs = [PathBuf::from(".")];
    let dirs = if dirs.is_empty() { &default_dirs[..] } else { dirs };

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut packed = 0usize;
    for rel in resources(files, workdir) {
        let Some((source, content)) = find(&rel, dirs) else {
            ui::warn(&format!("Could not find {} in {:?}", rel.display(), dirs));
            continue;
        };
        let name = rel.to_string_lossy().replace('\\', "/");
        let options = SimpleFileOptions::default().unix_permissions(mode_of(&source));
        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Cannot add {name} to archive"))?;
        writer
            .write_all(&content)
            .with_context(|| format!("Cannot write {name} to archive"))?;
        ui::dim(&name);
        packed += 1;
    }
    let archive = writer.finish().context("Cannot finish archive")?.into_inner();

    let mut out_name = exe.clone().into_os_string();
    out_name.push(OUTPUT_SUFFIX);
    let output = PathBuf::from(out_name);

    let mut file = File::create(&output).with_context(|| format!("Cannot create {}", output.display()))?;
    file.write_all(&body)?;
    file.write_all(&archive)?;
    set_executable(&output)?;

    ui::info(&format!("Packed {packed} file(s) into {}", output.display()));
    Ok(output)
}

/// Unpack the archive appended to `exe` into `workdir`
///
/// Returns the number of entries; an executable without an archive yields 0.
pub fn extract(exe: &Path, workdir: &Path) -> Result<usize> {
    let file = File::open(exe).with_context(|| format!("Cannot open {}", exe.display()))?;
    let mut archive = match ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            log::debug!("No embedded archive in {}: {e}", exe.display());
            return Ok(0);
        }
    };
    archive
        .extract(workdir)
        .with_context(|| format!("Cannot extract resources into {}", workdir.display()))?;
    log::info!("Extracted {} resource(s) into {}", archive.len(), workdir.display());
    Ok(archive.len())
}

fn find(rel: &Path, dirs: &[PathBuf]) -> Option<(PathBuf, Vec<u8>)> {
    dirs.iter().find_map(|dir| {
        let path = dir.join(rel);
        fs::read(&path).ok().map(|content| (path, content))
    })
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map_or(0o644, |m| m.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn mode_of(_path: &Path) -> u32 {
    0o644
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(OUTPUT_MODE))
        .with_context(|| format!("Cannot make {} executable", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
