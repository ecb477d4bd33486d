//! # Genesis
//!
//! Build single-binary installers out of idempotent, reversible tasks.
//!
//! An installer program registers a tree of [`tasktree`] nodes with an
//! [`Installer`] and calls [`Installer::done`]. The command line then decides
//! what happens: `install` applies every task that does not already hold,
//! `remove` undoes them last-first (restoring edited files from the
//! [`changestore`]), and `status` only reports. `build` appends the
//! referenced resource files to the executable so it can run anywhere.
//!
//! Every node prints a six-character tag; `--tags` and `--skip-tags` select
//! nodes by those tags.

pub mod cli;
pub mod facts;
pub mod history;
pub mod installer;
pub mod modules;
pub mod package;
pub mod paths;
pub mod runner;
pub mod ui;

pub use changestore::Store;
pub use facts::Facts;
pub use installer::Installer;
pub use tasktree::{
    Custom, Doer, IfThen, Module, Node, Outcome, Probe, Section, Status, StatusCount, Switch,
    Task, TagFilter,
};
