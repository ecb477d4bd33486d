//! Dependent pairs: the second node acts only if the first changed something

use crate::context::{RunContext, scoped};
use crate::doer::{Doer, Node};
use crate::types::Status;
use anyhow::Result;
use std::path::PathBuf;

/// Runs `then` only when `if` reports a change
///
/// Typical use: restart a service only when its configuration was edited.
#[derive(Debug)]
pub struct IfThen {
    condition: Box<Node>,
    then: Box<Node>,
}

impl IfThen {
    pub fn new(condition: impl Into<Node>, then: impl Into<Node>) -> Self {
        Self {
            condition: Box::new(condition.into()),
            then: Box::new(then.into()),
        }
    }
}

impl Doer for IfThen {
    fn id(&self) -> String {
        self.condition.id() + &self.then.id()
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        let id = self.id();
        scoped(ctx, &id, Status::Unknown, |ctx| {
            let first = self.condition.status(ctx).unwrap_or(Status::Fail);
            let second = self.then.status(ctx).unwrap_or(Status::Fail);
            Ok(first.combine(second))
        })
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        let id = self.id();
        scoped(ctx, &id, false, |ctx| {
            if self.condition.apply(ctx)? {
                self.then.apply(ctx)
            } else {
                Ok(false)
            }
        })
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        let id = self.id();
        scoped(ctx, &id, false, |ctx| {
            if self.condition.undo(ctx)? {
                self.then.undo(ctx)
            } else {
                Ok(false)
            }
        })
    }

    fn files(&self) -> Vec<PathBuf> {
        let mut files = self.condition.files();
        files.extend(self.then.files());
        files
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
    fn test_then_runs_once_when_if_changes() {
        let log = journal();
        let pair = IfThen::new(
            Task::new(Flag::new("config", &log)),
            Task::new(Flag::new("restart", &log)),
        );
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(pair.apply(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install config", "install restart"]);
    }

    #[test]
    fn test_then_skipped_when_if_unchanged() {
        let log = journal();
        let pair = IfThen::new(
            Task::new(Flag::new("config", &log).installed()),
            Task::new(Flag::new("restart", &log)),
        );
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(!pair.apply(&mut ctx).unwrap());
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_if_error_stops_then() {
        let log = journal();
        let mut config = Flag::new("config", &log);
        config.fail_install = true;
        let pair = IfThen::new(Task::new(config), Task::new(Flag::new("restart", &log)));
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(pair.apply(&mut ctx).is_err());
        assert_eq!(entries(&log), vec!["install config"]);
    }

    #[test]
    fn test_undo_mirrors_apply() {
        let log = journal();
        let pair = IfThen::new(
            Task::new(Flag::new("config", &log).installed()),
            Task::new(Flag::new("restart", &log).installed()),
        );
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(pair.undo(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["remove config", "remove restart"]);
    }

    #[test]
    fn test_status_and_id() {
        let log = journal();
        let pair = IfThen::new(
            Task::new(Flag::new("config", &log).installed()),
            Task::new(Flag::new("restart", &log)),
        );
        assert_eq!(pair.id(), "flag configflag restart");

        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);
        assert_eq!(pair.status(&mut ctx).unwrap(), Status::Fail);
    }
}
