//! Condition stage.

use arch_conform_core::{
    dependency_filter, evaluate, CandidateSet, CheckKind, FilterFn, FunctionSequence, Polarity,
    RuleError, TestResult,
};

use super::{TypeFilters, Types};

/// A condition applied to the selected types with a polarity.
#[derive(Debug)]
pub struct Conditions<'m> {
    types: Types<'m>,
    selection: FunctionSequence,
    condition: FunctionSequence,
    polarity: Polarity,
}

impl<'m> Conditions<'m> {
    pub(super) fn new(types: Types<'m>, selection: FunctionSequence, polarity: Polarity) -> Self {
        Self {
            types,
            selection,
            condition: FunctionSequence::new(),
            polarity,
        }
    }

    /// Continues the current group.
    #[must_use]
    pub fn and(self) -> Self {
        self
    }

    /// Opens a new group; a type conforms when any group selects it.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.condition.new_or_group();
        self
    }

    /// Depends on `target` (a namespace or type name).
    #[must_use]
    pub fn have_dependency_on(self, target: impl Into<String>) -> Self {
        self.have_dependency_on_any([target.into()])
    }

    /// Depends on at least one of `targets`.
    #[must_use]
    pub fn have_dependency_on_any<I, S>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::AnyOf, targets))
    }

    /// Depends on every one of `targets`.
    #[must_use]
    pub fn have_dependency_on_all<I, S>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::AllOf, targets))
    }

    /// Depends on nothing outside `targets` (no dependency at all passes).
    #[must_use]
    pub fn only_have_dependencies_on<I, S>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::OnlyAnyOrNone, targets))
    }

    /// Depends on some of `targets` and nothing outside them.
    #[must_use]
    pub fn only_have_dependencies_on_any<I, S>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::OnlyAny, targets))
    }

    /// Depends on all of `targets` and nothing outside them.
    #[must_use]
    pub fn only_have_dependencies_on_all<I, S>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::OnlyAll, targets))
    }

    /// Referenced by at least one type matching `users`.
    #[must_use]
    pub fn be_used_by<I, S>(self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.matching(dependency_filter(CheckKind::UsedBy, users))
    }

    /// Runs the selection, then the condition over the selected types.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a predicate or condition.
    pub fn get_result(&self) -> Result<TestResult, RuleError> {
        let ctx = self.types.context();
        let mut population = CandidateSet::all(self.types.provider());
        let selected = self.selection.execute(&ctx, &mut population)?;
        let mut candidates = CandidateSet::new(selected.into_iter().map(|i| population[i].handle));
        evaluate(&ctx, &mut candidates, &self.condition, self.polarity)
    }
}

impl TypeFilters for Conditions<'_> {
    fn matching(mut self, f: FilterFn) -> Self {
        self.condition.add_filter(f);
        self
    }
}
