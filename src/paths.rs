//! Path resolution for genesis
//!
//! # Environment Variables
//!
//! - `GENESIS_DIR` - Override the persisted-state directory (default `~/.genesis`)
//! - `GENESIS_TMPDIR` - Parent directory for the per-run working directory
//!
//! Both are read by the command line parser as fallbacks for `--dir` and
//! `--tmpdir`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for the state directory override
pub const ENV_STATE_DIR: &str = "GENESIS_DIR";

/// Environment variable for the working directory parent
pub const ENV_TMPDIR: &str = "GENESIS_TMPDIR";

/// Environment variable for the tags to run
pub const ENV_TAGS: &str = "GENESIS_TAGS";

/// Environment variable for the tags to skip
pub const ENV_SKIP_TAGS: &str = "GENESIS_SKIP_TAGS";

/// Default state directory, before expansion
pub const DEFAULT_STATE_DIR: &str = "~/.genesis";

/// Name of the command history file inside the state directory
pub const HISTORY_FILE: &str = "history.txt";

/// Resolve the state directory from the `--dir` value
///
/// An empty value falls back to [`DEFAULT_STATE_DIR`].
pub fn state_dir(dir: &str) -> Result<PathBuf> {
    let raw = if dir.trim().is_empty() {
        DEFAULT_STATE_DIR
    } else {
        dir
    };
    let path = expand(raw);
    if path.starts_with("~") {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        let rest = path.strip_prefix("~").unwrap_or(Path::new(""));
        return Ok(home.join(rest));
    }
    log::debug!("Using state dir: {}", path.display());
    Ok(path)
}

/// Path of the history file for a state directory
pub fn history_file(state_dir: &Path) -> PathBuf {
    state_dir.join(HISTORY_FILE)
}

/// Expand ~ and environment variables in a path string.
///
/// This is the canonical path expansion function for genesis. Modules
/// expand their target paths through it so `~/.bashrc` works as expected.
///
/// # Examples
///
/// ```
/// use genesis::paths;
///
/// // Expands ~ to home directory
/// let home_path = paths::expand("~/dotfiles");
///
/// // Expands environment variables
/// let var_path = paths::expand("$HOME/dotfiles");
/// ```
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Expand a path that may already be a `PathBuf`
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand(s),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    /// Only use in single-threaded test contexts.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_state_dir_default() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(state_dir("").unwrap(), home.join(".genesis"));
        assert_eq!(state_dir(DEFAULT_STATE_DIR).unwrap(), home.join(".genesis"));
    }

    #[test]
    fn test_state_dir_absolute() {
        assert_eq!(
            state_dir("/var/lib/genesis").unwrap(),
            PathBuf::from("/var/lib/genesis")
        );
    }

    #[test]
    fn test_history_file() {
        assert_eq!(
            history_file(Path::new("/state")),
            PathBuf::from("/state/history.txt")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        let result = expand("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_with_env_var() {
        with_env_var("GENESIS_TEST_VAR", "test_value", || {
            let result = expand("/path/$GENESIS_TEST_VAR/file");
            assert_eq!(result, PathBuf::from("/path/test_value/file"));
        });
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        // Unknown env vars are left as-is by shellexpand::full
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }

    #[test]
    fn test_expand_path() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path(Path::new("~/x")), home.join("x"));
    }
}
