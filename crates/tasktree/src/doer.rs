//! The Doer contract and the closed set of tree nodes

use crate::context::RunContext;
use crate::custom::Custom;
use crate::ifthen::IfThen;
use crate::section::Section;
use crate::switch::Switch;
use crate::tags;
use crate::task::Task;
use crate::types::Status;
use anyhow::Result;
use std::path::PathBuf;

/// Uniform capability of every node in the tree
///
/// `status` never mutates the system. `apply` is idempotent and returns
/// whether anything changed. `undo` reverses what `apply` did and is a safe
/// no-op when nothing was applied.
pub trait Doer: std::fmt::Debug {
    /// Deterministic identifier, hashed into the node's tag
    fn id(&self) -> String;

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status>;

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool>;

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool>;

    /// Resource files referenced anywhere beneath this node
    fn files(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Short token addressing this node on the command line
    fn tag(&self) -> String {
        tags::tag(&self.id())
    }
}

/// A node of the task tree
#[derive(Debug)]
pub enum Node {
    Task(Task),
    Section(Section),
    Switch(Switch),
    IfThen(IfThen),
    Custom(Custom),
}

impl Node {
    fn as_doer(&self) -> &dyn Doer {
        match self {
            Self::Task(n) => n,
            Self::Section(n) => n,
            Self::Switch(n) => n,
            Self::IfThen(n) => n,
            Self::Custom(n) => n,
        }
    }
}

impl Doer for Node {
    fn id(&self) -> String {
        self.as_doer().id()
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        self.as_doer().status(ctx)
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.as_doer().apply(ctx)
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.as_doer().undo(ctx)
    }

    fn files(&self) -> Vec<PathBuf> {
        self.as_doer().files()
    }
}

impl From<Task> for Node {
    fn from(task: Task) -> Self {
        Self::Task(task)
    }
}

impl From<Section> for Node {
    fn from(section: Section) -> Self {
        Self::Section(section)
    }
}

impl From<Switch> for Node {
    fn from(switch: Switch) -> Self {
        Self::Switch(switch)
    }
}

impl From<IfThen> for Node {
    fn from(pair: IfThen) -> Self {
        Self::IfThen(pair)
    }
}

impl From<Custom> for Node {
    fn from(custom: Custom) -> Self {
        Self::Custom(custom)
    }
}

/// Apply children in order, stopping at the first error
pub(crate) fn apply_all<'n>(
    children: impl Iterator<Item = &'n Node>,
    ctx: &mut RunContext<'_>,
) -> Result<bool> {
    let mut changed = false;
    for child in children {
        changed |= child.apply(ctx)?;
    }
    Ok(changed)
}

/// Undo children in the given order, stopping at the first error
pub(crate) fn undo_all<'n>(
    children: impl Iterator<Item = &'n Node>,
    ctx: &mut RunContext<'_>,
) -> Result<bool> {
    let mut changed = false;
    for child in children {
        changed |= child.undo(ctx)?;
    }
    Ok(changed)
}

/// Aggregate the status of every child; errors count as `Fail`
pub(crate) fn status_all<'n>(
    children: impl Iterator<Item = &'n Node>,
    ctx: &mut RunContext<'_>,
) -> Status {
    let mut status = Status::Pass;
    for child in children {
        let child_status = child.status(ctx).unwrap_or(Status::Fail);
        status = status.combine(child_status);
    }
    status
}
