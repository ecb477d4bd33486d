//! Core types for task-tree execution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of comparing reality against intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Already matches; nothing to do
    Pass,
    /// Does not match; action needed
    Fail,
    /// Cannot be determined (or filtered out)
    Unknown,
}

impl Status {
    /// Combine two statuses with `Fail` > `Unknown` > `Pass` priority
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Fail, _) | (_, Self::Fail) => Self::Fail,
            (Self::Unknown, _) | (_, Self::Unknown) => Self::Unknown,
            _ => Self::Pass,
        }
    }

    /// Aggregate many statuses; an empty set passes
    pub fn aggregate(statuses: impl IntoIterator<Item = Self>) -> Self {
        statuses.into_iter().fold(Self::Pass, Self::combine)
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a module found when inspecting the system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub status: Status,
    pub message: String,
}

impl Probe {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(Status::Pass, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(Status::Fail, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Status::Unknown, message)
    }
}

/// A reported per-task outcome line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Nothing needed doing
    Pass,
    /// A change was made
    Done,
    /// Inspection or mutation failed
    Fail,
    /// State could not be determined
    Unknown,
}

impl Outcome {
    /// Label shown in front of the message
    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "[PASS]",
            Self::Done => "[DONE]",
            Self::Fail => "[FAIL]",
            Self::Unknown => "[UNKNOWN]",
        }
    }
}

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub pass: usize,
    pub done: usize,
    pub fail: usize,
    pub unknown: usize,
}

impl StatusCount {
    /// Count one reported outcome
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass => self.pass += 1,
            Outcome::Done => self.done += 1,
            Outcome::Fail => self.fail += 1,
            Outcome::Unknown => self.unknown += 1,
        }
    }

    /// Merge another count into this one
    pub fn merge(&mut self, other: &Self) {
        self.pass += other.pass;
        self.done += other.done;
        self.fail += other.fail;
        self.unknown += other.unknown;
    }

    /// Total number of reported outcomes
    pub fn total(&self) -> usize {
        self.pass + self.done + self.fail + self.unknown
    }

    /// Check if the run had no failures
    pub fn is_success(&self) -> bool {
        self.fail == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_priority() {
        use Status::{Fail, Pass, Unknown};

        assert_eq!(Pass.combine(Pass), Pass);
        assert_eq!(Pass.combine(Unknown), Unknown);
        assert_eq!(Unknown.combine(Pass), Unknown);
        assert_eq!(Unknown.combine(Fail), Fail);
        assert_eq!(Fail.combine(Pass), Fail);
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(Status::aggregate([]), Status::Pass);
        assert_eq!(
            Status::aggregate([Status::Pass, Status::Unknown, Status::Pass]),
            Status::Unknown
        );
        assert_eq!(
            Status::aggregate([Status::Unknown, Status::Fail, Status::Pass]),
            Status::Fail
        );
    }

    #[test]
    fn test_status_count() {
        let mut count = StatusCount::default();
        count.record(Outcome::Done);
        count.record(Outcome::Done);
        count.record(Outcome::Pass);
        assert_eq!(count.done, 2);
        assert_eq!(count.total(), 3);
        assert!(count.is_success());

        let mut other = StatusCount::default();
        other.record(Outcome::Fail);
        count.merge(&other);
        assert_eq!(count.fail, 1);
        assert!(!count.is_success());
    }
}
