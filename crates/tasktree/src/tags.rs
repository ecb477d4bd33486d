//! Tag-based selective execution
//!
//! Every node is addressed by a short token derived from its ID. The filter
//! holds the tokens to run (`do`) and to skip; composite nodes hand their
//! children a copy with the `do` set cleared once they are selected, so the
//! whole subtree runs.

use std::collections::BTreeSet;

/// Number of hex characters in a tag
pub const TAG_LEN: usize = 6;

/// Compute the tag for a node ID
pub fn tag(id: &str) -> String {
    let hash = blake3::hash(id.as_bytes());
    hash.to_hex().as_str()[..TAG_LEN].to_string()
}

/// How the filter treats one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Run the node; composites run their whole subtree
    Do,
    /// Don't act on the node itself, but let composites classify children
    Pass,
    /// Ignore the node and everything beneath it
    Skip,
}

/// The do/skip tag sets in effect for one traversal level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    do_tags: BTreeSet<String>,
    skip_tags: BTreeSet<String>,
}

impl TagFilter {
    /// Create a filter; blank tokens are dropped
    pub fn new<D, S>(do_tags: D, skip_tags: S) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        Self {
            do_tags: normalize(do_tags),
            skip_tags: normalize(skip_tags),
        }
    }

    /// Create a filter from comma-separated lists
    pub fn from_csv(do_tags: &str, skip_tags: &str) -> Self {
        Self::new(do_tags.split(','), skip_tags.split(','))
    }

    pub fn do_tags(&self) -> &BTreeSet<String> {
        &self.do_tags
    }

    pub fn skip_tags(&self) -> &BTreeSet<String> {
        &self.skip_tags
    }

    /// Whether the filter lets everything run
    pub fn is_unfiltered(&self) -> bool {
        self.do_tags.is_empty() && self.skip_tags.is_empty()
    }

    /// Classify the node with the given ID
    pub fn classify(&self, id: &str) -> Verdict {
        let tag = tag(id);
        if self.skip_tags.contains(&tag) {
            Verdict::Skip
        } else if self.do_tags.is_empty() || self.do_tags.contains(&tag) {
            Verdict::Do
        } else {
            Verdict::Pass
        }
    }

    /// Copy of this filter with the `do` set cleared (skips still apply)
    pub fn without_do_tags(&self) -> Self {
        Self {
            do_tags: BTreeSet::new(),
            skip_tags: self.skip_tags.clone(),
        }
    }
}

fn normalize<I>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}
