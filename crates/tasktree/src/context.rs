//! Traversal context and reporting contract
//!
//! Every Doer call receives a [`RunContext`] holding the tag filter in effect
//! at that depth and the reporter that renders outcomes. Composite nodes pass
//! a narrowed copy to their children instead of mutating shared state.

use crate::tags::{TagFilter, Verdict};
use crate::types::{Outcome, StatusCount};
use anyhow::Result;

/// Receives per-node progress and outcome events
///
/// Implement this trait to render a run. The reporter owns the run's
/// [`StatusCount`]: every call to [`outcome`](Reporter::outcome) must count
/// exactly once.
pub trait Reporter {
    /// Called before a leaf task reports its outcome
    fn task_header(&mut self, tag: &str, description: &str);

    /// Called when a named composite starts
    fn section_header(&mut self, tag: &str, name: &str);

    /// Called when a named composite finishes, even on error
    fn section_footer(&mut self, tag: &str, name: &str);

    /// Called once per reported task outcome
    fn outcome(&mut self, outcome: Outcome, message: &str, error: Option<&anyhow::Error>);

    /// Counters accumulated so far
    fn counts(&self) -> StatusCount;
}

/// Per-level traversal state
pub struct RunContext<'a> {
    filter: TagFilter,
    reporter: &'a mut dyn Reporter,
}

impl<'a> RunContext<'a> {
    pub fn new(filter: TagFilter, reporter: &'a mut dyn Reporter) -> Self {
        Self { filter, reporter }
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    /// Classify a node against the filter at this level
    pub fn classify(&self, id: &str) -> Verdict {
        self.filter.classify(id)
    }

    /// Child context for a selected subtree: `do` tags cleared, skips kept
    pub fn unfiltered(&mut self) -> RunContext<'_> {
        RunContext {
            filter: self.filter.without_do_tags(),
            reporter: &mut *self.reporter,
        }
    }

    pub fn reporter(&mut self) -> &mut dyn Reporter {
        &mut *self.reporter
    }
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Run `body` for a composite node according to the filter verdict
///
/// Skipped nodes return `skipped` without descending. Selected nodes run
/// their children with `do` tags cleared; pass-through nodes hand the
/// unchanged filter down so each child is classified on its own.
pub(crate) fn scoped<T>(
    ctx: &mut RunContext<'_>,
    id: &str,
    skipped: T,
    body: impl FnOnce(&mut RunContext<'_>) -> Result<T>,
) -> Result<T> {
    match ctx.classify(id) {
        Verdict::Skip => Ok(skipped),
        Verdict::Do => body(&mut ctx.unfiltered()),
        Verdict::Pass => body(ctx),
    }
}

/// One event seen by a [`Tally`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Task { tag: String, description: String },
    SectionStart { tag: String, name: String },
    SectionEnd { tag: String, name: String },
    Outcome { outcome: Outcome, message: String },
}

/// Silent reporter that records events and counts
///
/// Useful for tests and for callers that only want the final counters.
#[derive(Debug, Default)]
pub struct Tally {
    counts: StatusCount,
    events: Vec<Event>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Outcomes in the order they were reported
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Outcome { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for Tally {
    fn task_header(&mut self, tag: &str, description: &str) {
        self.events.push(Event::Task {
            tag: tag.to_string(),
            description: description.to_string(),
        });
    }

    fn section_header(&mut self, tag: &str, name: &str) {
        self.events.push(Event::SectionStart {
            tag: tag.to_string(),
            name: name.to_string(),
        });
    }

    fn section_footer(&mut self, tag: &str, name: &str) {
        self.events.push(Event::SectionEnd {
            tag: tag.to_string(),
            name: name.to_string(),
        });
    }

    fn outcome(&mut self, outcome: Outcome, message: &str, _error: Option<&anyhow::Error>) {
        self.counts.record(outcome);
        self.events.push(Event::Outcome {
            outcome,
            message: message.to_string(),
        });
    }

    fn counts(&self) -> StatusCount {
        self.counts
    }
}
