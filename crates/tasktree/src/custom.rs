//! Adapter for slotting foreign doers into the tree

use crate::context::RunContext;
use crate::doer::Doer;
use crate::types::Status;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

type StatusFn = Box<dyn Fn(&dyn Doer, &mut RunContext<'_>) -> Result<Status>>;
type ActionFn = Box<dyn Fn(&dyn Doer, &mut RunContext<'_>) -> Result<bool>>;
type IdFn = Box<dyn Fn(&dyn Doer) -> String>;
type FilesFn = Box<dyn Fn(&dyn Doer) -> Vec<PathBuf>>;

/// Wraps any [`Doer`], optionally overriding each operation
///
/// Overrides receive the inner doer so they can delegate to it.
///
/// ```
/// use tasktree::{Custom, Doer, Section};
///
/// let custom = Custom::new(Section::new("inner"))
///     .with_id(|inner| format!("custom {}", inner.id()));
/// assert_eq!(custom.id(), "custom inner");
/// ```
pub struct Custom {
    inner: Box<dyn Doer>,
    status: Option<StatusFn>,
    apply: Option<ActionFn>,
    undo: Option<ActionFn>,
    id: Option<IdFn>,
    files: Option<FilesFn>,
}

impl Custom {
    pub fn new(inner: impl Doer + 'static) -> Self {
        Self {
            inner: Box::new(inner),
            status: None,
            apply: None,
            undo: None,
            id: None,
            files: None,
        }
    }

    #[must_use]
    pub fn with_status(
        mut self,
        f: impl Fn(&dyn Doer, &mut RunContext<'_>) -> Result<Status> + 'static,
    ) -> Self {
        self.status = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn with_apply(
        mut self,
        f: impl Fn(&dyn Doer, &mut RunContext<'_>) -> Result<bool> + 'static,
    ) -> Self {
        self.apply = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn with_undo(
        mut self,
        f: impl Fn(&dyn Doer, &mut RunContext<'_>) -> Result<bool> + 'static,
    ) -> Self {
        self.undo = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn with_id(mut self, f: impl Fn(&dyn Doer) -> String + 'static) -> Self {
        self.id = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn with_files(mut self, f: impl Fn(&dyn Doer) -> Vec<PathBuf> + 'static) -> Self {
        self.files = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("inner", &self.inner)
            .field("status", &self.status.is_some())
            .field("apply", &self.apply.is_some())
            .field("undo", &self.undo.is_some())
            .field("id", &self.id.is_some())
            .field("files", &self.files.is_some())
            .finish()
    }
}

impl Doer for Custom {
    fn id(&self) -> String {
        match &self.id {
            Some(f) => f(self.inner.as_ref()),
            None => self.inner.id(),
        }
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        match &self.status {
            Some(f) => f(self.inner.as_ref(), ctx),
            None => self.inner.status(ctx),
        }
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        match &self.apply {
            Some(f) => f(self.inner.as_ref(), ctx),
            None => self.inner.apply(ctx),
        }
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        match &self.undo {
            Some(f) => f(self.inner.as_ref(), ctx),
            None => self.inner.undo(ctx),
        }
    }

    fn files(&self) -> Vec<PathBuf> {
        match &self.files {
            Some(f) => f(self.inner.as_ref()),
            None => self.inner.files(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Tally;
    use crate::tags::TagFilter;
    use crate::task::Task;
    use crate::testing::{Flag, entries, journal};

    #[test]
    fn test_defaults_forward_to_inner() {
        let log = journal();
        let custom = Custom::new(Task::new(Flag::new("a", &log)));
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert_eq!(custom.id(), "flag a");
        assert!(custom.apply(&mut ctx).unwrap());
        assert_eq!(custom.status(&mut ctx).unwrap(), Status::Pass);
        assert!(custom.undo(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install a", "remove a"]);
    }

    #[test]
    fn test_overrides() {
        let log = journal();
        let custom = Custom::new(Task::new(Flag::new("a", &log)))
            .with_status(|_, _| Ok(Status::Unknown))
            .with_apply(|_, _| Ok(false))
            .with_undo(|inner, ctx| inner.apply(ctx))
            .with_files(|_| vec![PathBuf::from("files/a.conf")]);
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert_eq!(custom.status(&mut ctx).unwrap(), Status::Unknown);
        assert!(!custom.apply(&mut ctx).unwrap());
        assert!(entries(&log).is_empty());
        assert!(custom.undo(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install a"]);
        assert_eq!(custom.files(), vec![PathBuf::from("files/a.conf")]);
    }
}
