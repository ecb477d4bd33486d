//! # Tasktree
//!
//! Idempotent, reversible task trees.
//!
//! A tree is built from [`Node`]s. Leaves are [`Task`]s, each owning one
//! [`Module`] that knows how to inspect, make and reverse a single change.
//! Composite nodes decide order and dependencies:
//!
//! - [`Section`]: ordered children; apply in order, undo in reverse, fail fast
//! - [`Switch`]: like a section, but each case is guarded by a condition
//! - [`IfThen`]: the second node acts only if the first changed something
//! - [`Custom`]: wraps any [`Doer`] and overrides individual operations
//!
//! ## Tags
//!
//! Every node has a six-character [`tag`] derived from its ID. A
//! [`TagFilter`] selects nodes to run or skip; selecting a composite runs
//! its whole subtree. The filter travels down the tree inside a
//! [`RunContext`], together with the [`Reporter`] that renders outcomes and
//! keeps the [`StatusCount`].
//!
//! ## Example
//!
//! ```
//! use tasktree::{Doer, Module, Probe, RunContext, Section, TagFilter, Tally};
//! use std::cell::Cell;
//!
//! #[derive(Debug, Default)]
//! struct Lamp { on: Cell<bool> }
//!
//! impl Module for Lamp {
//!     fn id(&self) -> String { "lamp".into() }
//!     fn status(&self) -> anyhow::Result<Probe> {
//!         Ok(if self.on.get() { Probe::pass("On.") } else { Probe::fail("Off.") })
//!     }
//!     fn install(&self) -> anyhow::Result<String> {
//!         self.on.set(true);
//!         Ok("Turned on.".into())
//!     }
//!     fn remove(&self) -> anyhow::Result<String> {
//!         self.on.set(false);
//!         Ok("Turned off.".into())
//!     }
//! }
//!
//! let mut section = Section::new("lights");
//! section.add_task(Lamp::default());
//!
//! let mut tally = Tally::new();
//! let mut ctx = RunContext::new(TagFilter::default(), &mut tally);
//! assert!(section.apply(&mut ctx)?);
//! assert!(!section.apply(&mut ctx)?);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod context;
pub mod custom;
pub mod doer;
pub mod ifthen;
pub mod module;
pub mod section;
pub mod switch;
pub mod tags;
pub mod task;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use context::{Event, Reporter, RunContext, Tally};
pub use custom::Custom;
pub use doer::{Doer, Node};
pub use ifthen::IfThen;
pub use module::{BoxedModule, Module};
pub use section::Section;
pub use switch::Switch;
pub use tags::{TAG_LEN, TagFilter, Verdict, tag};
pub use task::Task;
pub use types::{Outcome, Probe, Status, StatusCount};
