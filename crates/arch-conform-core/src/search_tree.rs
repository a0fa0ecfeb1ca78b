//! Prefix trie over target namespaces and type names.
//!
//! Built once per dependency check from the caller's target strings. A lookup
//! walks the segments of a full type name and reports every target whose
//! segment chain is a prefix of it, so `App.Core` and `App.Core.Util` both
//! match `App.Core.Util.Helper`.

use std::collections::{BTreeSet, HashMap};

use crate::metadata::NESTED_SEPARATOR;

/// Identifier of one distinct target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub usize);

#[derive(Debug, Default)]
struct Node {
    terminal: Option<TargetId>,
    children: HashMap<String, Node>,
}

/// Segment trie over target strings.
#[derive(Debug)]
pub struct NamespaceSearchTree {
    root: Node,
    targets: Vec<String>,
    case_sensitive: bool,
}

impl NamespaceSearchTree {
    /// Builds a tree from target strings.
    ///
    /// Duplicate targets (after case folding when case-insensitive) share one
    /// [`TargetId`]. Empty strings are ignored.
    #[must_use]
    pub fn build<I, S>(targets: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self {
            root: Node::default(),
            targets: Vec::new(),
            case_sensitive,
        };
        for target in targets {
            tree.insert(target.as_ref());
        }
        tree
    }

    fn insert(&mut self, target: &str) {
        let folded = fold(target, self.case_sensitive);
        if split_segments(&folded).next().is_none() {
            return;
        }

        let mut node = &mut self.root;
        for segment in split_segments(&folded) {
            node = node.children.entry(segment.to_string()).or_default();
        }

        if node.terminal.is_none() {
            node.terminal = Some(TargetId(self.targets.len()));
            self.targets.push(target.to_string());
        }
    }

    /// Returns the ids of every target matching `full_name` at segment boundaries.
    #[must_use]
    pub fn lookup(&self, full_name: &str) -> BTreeSet<TargetId> {
        let folded = fold(full_name, self.case_sensitive);
        let mut matches = BTreeSet::new();
        let mut node = &self.root;

        for segment in split_segments(&folded) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if let Some(id) = node.terminal {
                        matches.insert(id);
                    }
                }
                None => break,
            }
        }

        matches
    }

    /// Whether any target matches `full_name`.
    #[must_use]
    pub fn matches(&self, full_name: &str) -> bool {
        !self.lookup(full_name).is_empty()
    }

    /// Number of distinct targets.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.targets.len()
    }

    /// Returns the target string as originally supplied.
    #[must_use]
    pub fn target(&self, id: TargetId) -> Option<&str> {
        self.targets.get(id.0).map(String::as_str)
    }

    /// Iterates over targets with their ids.
    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &str)> {
        self.targets
            .iter()
            .enumerate()
            .map(|(i, t)| (TargetId(i), t.as_str()))
    }
}

fn fold(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        value.to_lowercase()
    }
}

fn split_segments(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(['.', NESTED_SEPARATOR])
        .filter(|segment| !segment.is_empty())
}
