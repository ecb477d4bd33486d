//! Module trait - the leaf capability behind every task
//!
//! A Module describes one idempotent change to the system. It knows how to
//! inspect whether the change already holds, how to make it, and how to
//! reverse it. Modules never see the tree, the tag filter or the reporter;
//! a [`Task`](crate::Task) wraps each one and handles all of that.

use crate::types::Probe;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// Core trait for task adapters
///
/// # Example
///
/// ```
/// use tasktree::{Module, Probe};
///
/// #[derive(Debug)]
/// struct Touch { path: String }
///
/// impl Module for Touch {
///     fn id(&self) -> String {
///         format!("touch {}", self.path)
///     }
///
///     fn status(&self) -> anyhow::Result<Probe> {
///         if std::path::Path::new(&self.path).exists() {
///             Ok(Probe::pass("File exists."))
///         } else {
///             Ok(Probe::fail("File is missing."))
///         }
///     }
///
///     fn install(&self) -> anyhow::Result<String> {
///         std::fs::write(&self.path, "")?;
///         Ok("Created file.".into())
///     }
///
///     fn remove(&self) -> anyhow::Result<String> {
///         std::fs::remove_file(&self.path)?;
///         Ok("Removed file.".into())
///     }
/// }
/// ```
pub trait Module: fmt::Debug {
    /// Deterministic identifier
    ///
    /// Must not contain run-varying data such as timestamps: it is hashed
    /// into the tag users pass on the command line.
    fn id(&self) -> String;

    /// Human-readable description, shown next to the tag
    fn describe(&self) -> String {
        self.id()
    }

    /// Resource files this module reads, for packaging
    fn files(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Inspect the system without changing it
    ///
    /// `Ok` with a failing probe means "not applied yet"; `Err` means the
    /// state could not be inspected at all.
    fn status(&self) -> Result<Probe>;

    /// Make the change, returning a message describing what was done
    fn install(&self) -> Result<String>;

    /// Reverse the change, returning a message describing what was done
    fn remove(&self) -> Result<String>;
}

/// A boxed module for type-erased storage
pub type BoxedModule = Box<dyn Module>;
