//! Dependency strategies: the evidence accumulators driven by the walker.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::search_tree::{NamespaceSearchTree, TargetId};

/// The question a dependency check asks about one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Depends on at least one target.
    AnyOf,
    /// Depends on every target.
    AllOf,
    /// Depends on nothing outside the targets.
    OnlyAnyOrNone,
    /// Depends on at least one target and nothing outside them.
    OnlyAny,
    /// Depends on every target and nothing outside them.
    OnlyAll,
    /// Is referenced by a type matching the targets.
    UsedBy,
}

impl CheckKind {
    /// Whether references outside the targets disqualify a type.
    #[must_use]
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::OnlyAnyOrNone | Self::OnlyAny | Self::OnlyAll)
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AnyOf => "any-of",
            Self::AllOf => "all-of",
            Self::OnlyAnyOrNone => "only-any-or-none",
            Self::OnlyAny => "only-any",
            Self::OnlyAll => "only-all",
            Self::UsedBy => "used-by",
        };
        write!(f, "{name}")
    }
}

/// Evidence collected while walking one type.
///
/// Created fresh for every type; read once for the verdict.
#[derive(Debug)]
pub struct DependencyStrategy<'t> {
    kind: CheckKind,
    tree: &'t NamespaceSearchTree,
    found: BTreeSet<TargetId>,
    found_outside: bool,
    last_match: Option<String>,
    last_outside_match: Option<String>,
    referenced: HashSet<String>,
}

impl<'t> DependencyStrategy<'t> {
    /// Creates an empty strategy over a search tree.
    #[must_use]
    pub fn new(kind: CheckKind, tree: &'t NamespaceSearchTree) -> Self {
        Self {
            kind,
            tree,
            found: BTreeSet::new(),
            found_outside: false,
            last_match: None,
            last_outside_match: None,
            referenced: HashSet::new(),
        }
    }

    /// The kind of check.
    #[must_use]
    pub fn kind(&self) -> CheckKind {
        self.kind
    }

    /// Feeds one referenced full name.
    ///
    /// `exempt` references (compiler-generated artifacts) never count as
    /// outside dependencies.
    pub fn add_reference(&mut self, full_name: &str, exempt: bool) {
        if self.kind == CheckKind::UsedBy {
            self.referenced.insert(full_name.to_string());
            return;
        }

        let matches = self.tree.lookup(full_name);
        if matches.is_empty() {
            if !exempt {
                self.found_outside = true;
                self.last_outside_match = Some(full_name.to_string());
            }
        } else {
            self.found.extend(matches);
            self.last_match = Some(full_name.to_string());
        }
    }

    /// Whether the verdict can no longer change.
    #[must_use]
    pub fn can_finish_early(&self) -> bool {
        match self.kind {
            CheckKind::AnyOf => !self.found.is_empty(),
            CheckKind::AllOf => self.has_all_targets(),
            CheckKind::OnlyAnyOrNone | CheckKind::OnlyAny | CheckKind::OnlyAll => {
                self.found_outside
            }
            CheckKind::UsedBy => false,
        }
    }

    /// The verdict for the walked type.
    ///
    /// `UsedBy` strategies only record references; their verdict is decided
    /// by a reverse lookup over [`Self::referenced`], so this returns `false`.
    #[must_use]
    pub fn passes(&self) -> bool {
        match self.kind {
            CheckKind::AnyOf => !self.found.is_empty(),
            CheckKind::AllOf => self.has_all_targets(),
            CheckKind::OnlyAnyOrNone => !self.found_outside,
            CheckKind::OnlyAny => !self.found_outside && !self.found.is_empty(),
            CheckKind::OnlyAll => !self.found_outside && self.has_all_targets(),
            CheckKind::UsedBy => false,
        }
    }

    fn has_all_targets(&self) -> bool {
        self.found.len() == self.tree.terminal_count()
    }

    /// Distinct targets matched so far.
    #[must_use]
    pub fn found(&self) -> &BTreeSet<TargetId> {
        &self.found
    }

    /// Whether a non-exempt reference matched no target.
    #[must_use]
    pub fn found_outside(&self) -> bool {
        self.found_outside
    }

    /// Every full name fed to a `UsedBy` strategy.
    #[must_use]
    pub fn referenced(&self) -> &HashSet<String> {
        &self.referenced
    }

    /// Human-readable witness for the verdict, if one applies.
    #[must_use]
    pub fn explanation(&self) -> Option<String> {
        match self.kind {
            CheckKind::AnyOf => self
                .last_match
                .as_ref()
                .map(|m| format!("has a dependency on {m}")),
            CheckKind::AllOf => self.missing_targets_explanation(),
            CheckKind::OnlyAnyOrNone | CheckKind::OnlyAny | CheckKind::OnlyAll => {
                if let Some(outside) = &self.last_outside_match {
                    Some(format!("has a dependency on {outside}, which is not allowed"))
                } else if self.kind == CheckKind::OnlyAny && self.found.is_empty() {
                    Some("has no dependency on any allowed target".to_string())
                } else if self.kind == CheckKind::OnlyAll {
                    self.missing_targets_explanation()
                } else {
                    None
                }
            }
            CheckKind::UsedBy => None,
        }
    }

    fn missing_targets_explanation(&self) -> Option<String> {
        let missing: Vec<&str> = self
            .tree
            .targets()
            .filter(|(id, _)| !self.found.contains(id))
            .map(|(_, t)| t)
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(format!("has no dependency on {}", missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: CheckKind, targets: &[&str], refs: &[&str]) -> (bool, Option<String>) {
        let tree = NamespaceSearchTree::build(targets, false);
        let mut strategy = DependencyStrategy::new(kind, &tree);
        for r in refs {
            strategy.add_reference(r, false);
        }
        (strategy.passes(), strategy.explanation())
    }

    #[test]
    fn any_of_needs_one_match() {
        assert!(!run(CheckKind::AnyOf, &["X"], &[]).0);
        let (passes, why) = run(CheckKind::AnyOf, &["X"], &["Z.Other", "X.Thing"]);
        assert!(passes);
        assert_eq!(why.as_deref(), Some("has a dependency on X.Thing"));
    }

    #[test]
    fn all_of_needs_every_target() {
        let (passes, why) = run(CheckKind::AllOf, &["X", "Y"], &["X.A"]);
        assert!(!passes);
        assert_eq!(why.as_deref(), Some("has no dependency on Y"));

        let (passes, why) = run(CheckKind::AllOf, &["X", "Y"], &["X.A", "Y.B"]);
        assert!(passes);
        assert!(why.is_none());
    }

    #[test]
    fn only_any_or_none_fails_on_outside_reference() {
        let (passes, why) = run(CheckKind::OnlyAnyOrNone, &["X"], &["X.A", "Z.B"]);
        assert!(!passes);
        assert!(why.unwrap().contains("Z.B"));

        assert!(run(CheckKind::OnlyAnyOrNone, &["X"], &[]).0);
    }

    #[test]
    fn only_any_and_only_all() {
        assert!(!run(CheckKind::OnlyAny, &["X"], &[]).0);
        assert!(run(CheckKind::OnlyAny, &["X", "Y"], &["Y.A"]).0);
        assert!(!run(CheckKind::OnlyAll, &["X", "Y"], &["Y.A"]).0);
        assert!(run(CheckKind::OnlyAll, &["X", "Y"], &["Y.A", "X.B"]).0);
        assert!(!run(CheckKind::OnlyAll, &["X", "Y"], &["Y.A", "X.B", "W"]).0);
    }

    #[test]
    fn exempt_references_never_count_as_outside() {
        let tree = NamespaceSearchTree::build(["X"], false);
        let mut strategy = DependencyStrategy::new(CheckKind::OnlyAnyOrNone, &tree);
        strategy.add_reference("<>c", true);
        assert!(!strategy.found_outside());
        assert!(strategy.passes());
    }

    #[test]
    fn early_exit_signals() {
        let tree = NamespaceSearchTree::build(["X", "Y"], false);

        let mut any = DependencyStrategy::new(CheckKind::AnyOf, &tree);
        assert!(!any.can_finish_early());
        any.add_reference("X.A", false);
        assert!(any.can_finish_early());

        let mut all = DependencyStrategy::new(CheckKind::AllOf, &tree);
        all.add_reference("X.A", false);
        assert!(!all.can_finish_early());
        all.add_reference("Y.A", false);
        assert!(all.can_finish_early());

        let mut only = DependencyStrategy::new(CheckKind::OnlyAll, &tree);
        only.add_reference("X.A", false);
        only.add_reference("Y.A", false);
        assert!(!only.can_finish_early());
        only.add_reference("Q", false);
        assert!(only.can_finish_early());
    }

    #[test]
    fn used_by_records_everything() {
        let tree = NamespaceSearchTree::build(["X"], false);
        let mut strategy = DependencyStrategy::new(CheckKind::UsedBy, &tree);
        strategy.add_reference("A.B", false);
        strategy.add_reference("X.C", false);
        assert!(!strategy.can_finish_early());
        assert!(strategy.referenced().contains("A.B"));
        assert!(strategy.referenced().contains("X.C"));
    }

    #[test]
    fn single_target_any_equals_all() {
        for refs in [&[][..], &["X.A"][..], &["Q"][..], &["Q", "X"][..]] {
            assert_eq!(
                run(CheckKind::AnyOf, &["X"], refs).0,
                run(CheckKind::AllOf, &["X"], refs).0
            );
        }
    }

    #[test]
    fn only_any_implies_any_of_and_only_any_or_none() {
        let cases: [&[&str]; 4] = [&[], &["X.A"], &["X.A", "Z"], &["Z"]];
        for refs in cases {
            if run(CheckKind::OnlyAny, &["X", "Y"], refs).0 {
                assert!(run(CheckKind::AnyOf, &["X", "Y"], refs).0);
                assert!(run(CheckKind::OnlyAnyOrNone, &["X", "Y"], refs).0);
            }
        }
    }
}
