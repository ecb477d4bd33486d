//! Ordered groups of nodes

use crate::context::{RunContext, scoped};
use crate::doer::{Doer, Node, apply_all, status_all, undo_all};
use crate::module::Module;
use crate::tags;
use crate::task::Task;
use crate::types::Status;
use anyhow::Result;
use std::path::PathBuf;

/// An ordered sequence of children with an optional display name
///
/// Children apply in registration order and undo in reverse, stopping at
/// the first error. An anonymous section is addressed by the concatenation
/// of its children's IDs.
#[derive(Debug, Default)]
pub struct Section {
    name: String,
    children: Vec<Node>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Append a child node
    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.children.push(node.into());
        self
    }

    /// Append a module wrapped in a [`Task`]
    pub fn add_task(&mut self, module: impl Module + 'static) -> &mut Self {
        self.add(Task::new(module))
    }

    fn run<T>(
        &self,
        ctx: &mut RunContext<'_>,
        skipped: T,
        body: impl FnOnce(&[Node], &mut RunContext<'_>) -> Result<T>,
    ) -> Result<T> {
        let id = self.id();
        scoped(ctx, &id, skipped, |ctx| {
            framed(ctx, &self.name, &id, |ctx| body(&self.children, ctx))
        })
    }
}

/// Wrap `body` in header and footer lines when `name` is set
pub(crate) fn framed<T>(
    ctx: &mut RunContext<'_>,
    name: &str,
    id: &str,
    body: impl FnOnce(&mut RunContext<'_>) -> Result<T>,
) -> Result<T> {
    if name.is_empty() {
        return body(ctx);
    }
    let tag = tags::tag(id);
    ctx.reporter().section_header(&tag, name);
    let result = body(ctx);
    ctx.reporter().section_footer(&tag, name);
    result
}

impl Doer for Section {
    fn id(&self) -> String {
        if self.name.is_empty() {
            self.children.iter().map(Doer::id).collect()
        } else {
            self.name.clone()
        }
    }

    fn status(&self, ctx: &mut RunContext<'_>) -> Result<Status> {
        self.run(ctx, Status::Unknown, |children, ctx| {
            Ok(status_all(children.iter(), ctx))
        })
    }

    fn apply(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.run(ctx, false, |children, ctx| apply_all(children.iter(), ctx))
    }

    fn undo(&self, ctx: &mut RunContext<'_>) -> Result<bool> {
        self.run(ctx, false, |children, ctx| {
            undo_all(children.iter().rev(), ctx)
        })
    }

    fn files(&self) -> Vec<PathBuf> {
        self.children.iter().flat_map(Doer::files).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Event, Reporter, Tally};
    use crate::tags::{TagFilter, tag};
    use crate::testing::{Flag, entries, journal};
    use crate::types::Outcome;

    fn abc(log: &crate::testing::Journal) -> (Section, Vec<Flag>) {
        let flags: Vec<Flag> = ["a", "b", "c"].iter().map(|n| Flag::new(n, log)).collect();
        let mut section = Section::new("abc");
        for flag in &flags {
            section.add_task(flag.clone());
        }
        (section, flags)
    }

    #[test]
    fn test_apply_in_order() {
        let log = journal();
        let (section, _) = abc(&log);
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(section.apply(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install a", "install b", "install c"]);
    }

    #[test]
    fn test_apply_fails_fast() {
        let log = journal();
        let mut section = Section::new("");
        section.add_task(Flag::new("a", &log));
        let mut b = Flag::new("b", &log);
        b.fail_install = true;
        section.add_task(b);
        section.add_task(Flag::new("c", &log));

        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);
        let err = section.apply(&mut ctx).unwrap_err();

        assert!(err.to_string().contains("install of b failed"));
        assert_eq!(entries(&log), vec!["install a", "install b"]);
    }

    #[test]
    fn test_undo_in_reverse_order() {
        let log = journal();
        let (section, flags) = abc(&log);
        for flag in &flags {
            *flag.installed.borrow_mut() = true;
        }
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(section.undo(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["remove c", "remove b", "remove a"]);
    }

    #[test]
    fn test_undo_fails_fast() {
        let log = journal();
        let mut section = Section::new("");
        section.add_task(Flag::new("a", &log).installed());
        let mut b = Flag::new("b", &log).installed();
        b.fail_remove = true;
        section.add_task(b);
        section.add_task(Flag::new("c", &log).installed());

        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert!(section.undo(&mut ctx).is_err());
        assert_eq!(entries(&log), vec!["remove c", "remove b"]);
    }

    #[test]
    fn test_status_aggregates_all_children() {
        let log = journal();
        let mut section = Section::new("");
        let mut broken = Flag::new("broken", &log);
        broken.status_error = true;
        section.add_task(broken);
        let mut unknown = Flag::new("unknown", &log);
        unknown.unknown = true;
        section.add_task(unknown);
        section.add_task(Flag::new("set", &log).installed());

        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);

        assert_eq!(section.status(&mut ctx).unwrap(), Status::Fail);
        drop(ctx);
        // Every child was inspected despite the first error.
        assert_eq!(
            tally.outcomes(),
            vec![Outcome::Fail, Outcome::Unknown, Outcome::Pass]
        );
    }

    #[test]
    fn test_status_unknown_beats_pass() {
        let log = journal();
        let mut section = Section::new("");
        section.add_task(Flag::new("set", &log).installed());
        let mut unknown = Flag::new("unknown", &log);
        unknown.unknown = true;
        section.add_task(unknown);

        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);
        assert_eq!(section.status(&mut ctx).unwrap(), Status::Unknown);
    }

    #[test]
    fn test_id() {
        let log = journal();
        let (named, _) = abc(&log);
        assert_eq!(named.id(), "abc");

        let mut anonymous = Section::new("");
        anonymous.add_task(Flag::new("a", &log));
        anonymous.add_task(Flag::new("b", &log));
        assert_eq!(anonymous.id(), "flag aflag b");
    }

    #[test]
    fn test_named_section_is_framed() {
        let log = journal();
        let (section, _) = abc(&log);
        let mut tally = Tally::new();
        let mut ctx = RunContext::new(TagFilter::default(), &mut tally);
        section.status(&mut ctx).unwrap();
        drop(ctx);

        let events = tally.events();
        assert_eq!(
            events.first(),
            Some(&Event::SectionStart {
                tag: tag("abc"),
                name: "abc".into()
            })
        );
        assert_eq!(
            events.last(),
            Some(&Event::SectionEnd {
                tag: tag("abc"),
                name: "abc".into()
            })
        );
    }

    #[test]
    fn test_selecting_section_runs_whole_subtree() {
        let log = journal();
        let (selected, _) = abc(&log);
        let mut other = Section::new("other");
        other.add_task(Flag::new("x", &log));
        let mut root = Section::new("");
        root.add(selected);
        root.add(other);

        let mut tally = Tally::new();
        let filter = TagFilter::new([tag("abc")], Vec::<String>::new());
        let mut ctx = RunContext::new(filter, &mut tally);

        assert!(root.apply(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install a", "install b", "install c"]);
    }

    #[test]
    fn test_selecting_nested_task() {
        let log = journal();
        let (section, _) = abc(&log);
        let mut tally = Tally::new();
        let filter = TagFilter::new([tag("flag b")], Vec::<String>::new());
        let mut ctx = RunContext::new(filter, &mut tally);

        assert!(section.apply(&mut ctx).unwrap());
        assert_eq!(entries(&log), vec!["install b"]);
    }

    #[test]
    fn test_skipped_section_is_not_entered() {
        let log = journal();
        let (section, _) = abc(&log);
        let mut tally = Tally::new();
        let filter = TagFilter::new(Vec::<String>::new(), [tag("abc")]);
        let mut ctx = RunContext::new(filter, &mut tally);

        assert_eq!(section.status(&mut ctx).unwrap(), Status::Unknown);
        assert!(!section.apply(&mut ctx).unwrap());
        drop(ctx);
        assert!(entries(&log).is_empty());
        assert!(tally.events().is_empty());
    }

    #[test]
    fn test_skip_inside_selected_section() {
        let log = journal();
        let (section, _) = abc(&log);
        let mut tally = Tally::new();
        let filter = TagFilter::new([tag("abc")], [tag("flag b")]);
        let mut ctx = RunContext::new(filter, &mut tally);

        section.apply(&mut ctx).unwrap();
        drop(ctx);
        assert_eq!(entries(&log), vec!["install a", "install c"]);
        assert_eq!(tally.counts().done, 2);
    }
}
