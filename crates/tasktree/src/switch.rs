//! Branching groups whose cases are chosen at construction time

use crate::context::{RunContext, scoped};
use crate::doer::{Doer, Node, apply_all, status_all, undo_all};
use crate::section::framed;
use crate::types::Status;
use anyhow::Result;
use std::path::PathBuf;

/// A group of cases, each guarded by a condition fixed when it is added
///
/// Only selected cases take part in status, apply and undo; they follow
/// the same ordering and fail-fast rules as a [`Section`](crate::Section).
///
/// ```
/// use tasktree::{Section, Switch};
///
/// let distro = "debian";
/// let mut switch = Switch::new("packages");
/// switch
///     .case(distro == "debian", Section::new("apt"))
///     .case(distro == "fedora", Section::new("dnf"))
///     .otherwise(Section::new("fallback"));
/// assert_eq!(switch.selected().count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Switch {
    name: String,
    cases: Vec<(bool, Node)>,
}

impl Switch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a case that runs when `condition` holds
    pub fn case(&mut self, condition: bool, node: impl Into<Node>) -> &mut Self {
        self.cases.push((condition, node.into()));
        self
    }

    /// Add a case that runs only when no earlier case was selected
    pub fn otherwise(&mut self, node: impl Into<Node>) -> &mut Self {
        let condition = !self.cases.iter().any(|(selected, _)| *selected);
        self.case(condition, node)
    }

    /// Cases whose condition held
    pub fn selected(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.cases
            .iter()
            .filter(|(selected, _)| *selected)
            .map(|(_, node)| node)
    }

    fn run<T>(
        &self,
        ctx: &mut RunContext<'_>,
        skipped: T,
        body: impl FnOnce(&mut RunContext<'_>) -> Result<T>,
    ) -> Result<T> {
        let id = self.id();
        scoped(ctx, &id, skipped, |ctx| framed(ctx, &self.name, &id, body))
    }
}

impl Doer for Switch {
    fn id(&self) -> String {
        if self.name.is_empty() {
            self.cases.iter().map(|(_, node)| node.id()).collect()
        } else {
            self.name.clone()
        }
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        self.run(ctx, Status::Unknown, |ctx| {
            Ok(status_all(self.selected(), ctx))
        })
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.run(ctx, false, |ctx| apply_all(self.selected(), ctx))
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.run(ctx, false, |ctx| undo_all(self.selected().rev(), ctx))
    }

    /// Files of every case, selected or not, so a package built on one
    /// machine carries what the others need.
    fn files(&self) -> Vec<PathBuf> {
        self.cases
            .iter()
            .flat_map(|(_, node)| node.files())
            .collect()
    }
}
