//! Leaf node wrapping a single module

use crate::context::RunContext;
use crate::doer::Doer;
use crate::module::{BoxedModule, Module};
use crate::tags::{self, Verdict};
use crate::types::{Outcome, Status};
use anyhow::{Result, anyhow};
use std::path::PathBuf;

/// The only node that owns a module directly
#[derive(Debug)]
pub struct Task {
    module: BoxedModule,
}

impl Task {
    pub fn new(module: impl Module + 'static) -> Self {
        Self {
            module: Box::new(module),
        }
    }

    pub fn from_boxed(module: BoxedModule) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    /// Print the header; returns `false` when the filter leaves this task out
    fn begin(&self, ctx: &mut RunContext<'_>) -> bool {
        let id = self.module.id();
        // A leaf has no children, so pass-through behaves like skip.
        if ctx.classify(&id) != Verdict::Do {
            log::trace!("Filtered out: {id}");
            return false;
        }
        let description = self.module.describe();
        ctx.reporter().task_header(&tags::tag(&id), &description);
        true
    }
}

fn report_error(ctx: &mut RunContext<'_>, error: &anyhow::Error) {
    ctx.reporter()
        .outcome(Outcome::Fail, &error.to_string(), Some(error));
}

impl Doer for Task {
    fn id(&self) -> String {
        self.module.id()
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        if !self.begin(ctx) {
            return Ok(Status::Unknown);
        }
        match self.module.status() {
            Ok(probe) => {
                let outcome = match probe.status {
                    Status::Pass => Outcome::Pass,
                    Status::Fail => Outcome::Fail,
                    Status::Unknown => Outcome::Unknown,
                };
                ctx.reporter().outcome(outcome, &probe.message, None);
                Ok(probe.status)
            }
            Err(e) => {
                report_error(ctx, &e);
                Err(e)
            }
        }
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        if !self.begin(ctx) {
            return Ok(false);
        }

        if let Ok(probe) = self.module.status()
            && probe.status.is_pass()
        {
            ctx.reporter().outcome(Outcome::Pass, &probe.message, None);
            return Ok(false);
        }

        let message = match self.module.install() {
            Ok(message) => message,
            Err(e) => {
                report_error(ctx, &e);
                return Err(e);
            }
        };

        match self.module.status() {
            Ok(probe) if probe.status == Status::Fail => {
                let e = anyhow!("post-install check did not pass: {}", probe.message);
                report_error(ctx, &e);
                Err(e)
            }
            Ok(_) => {
                ctx.reporter().outcome(Outcome::Done, &message, None);
                Ok(true)
            }
            Err(e) => {
                let e = e.context("post-install check failed");
                report_error(ctx, &e);
                Err(e)
            }
        }
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        if !self.begin(ctx) {
            return Ok(false);
        }

        match self.module.status() {
            Ok(probe) if probe.status == Status::Fail => {
                ctx.reporter().outcome(Outcome::Pass, &probe.message, None);
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) => {
                report_error(ctx, &e);
                return Err(e);
            }
        }

        match self.module.remove() {
            Ok(message) => {
                ctx.reporter().outcome(Outcome::Done, &message, None);
                Ok(true)
            }
            Err(e) => {
                report_error(ctx, &e);
                Err(e)
            }
        }
    }

    fn files(&self) -> Vec<PathBuf> {
        self.module.files()
    }
}
