//! The rule composition engine.
//!
//! A [`FunctionSequence`] is an ordered list of groups, each an ordered list
//! of filters. Filters inside a group narrow the candidate set left to right
//! (AND); the groups are evaluated independently from the full set and their
//! survivors are united (OR).
//!
//! ```text
//! [f1, f2] or [f3]      over {a, b, c}
//!   group 1: {a,b,c} -f1-> {a,b} -f2-> {a}
//!   group 2: {a,b,c} -f3-> {c}
//!   selected = {a, c}, not selected = {b}
//! ```

use std::ops::{Index, IndexMut};

use tracing::debug;

use crate::config::CheckOptions;
use crate::metadata::{MetadataProvider, TypeDefinition, TypeHandle};
use crate::result::TestResult;
use crate::strategy::CheckKind;

/// Errors raised while running filters.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A dependency check was given no targets.
    #[error("{kind} dependency check needs at least one target")]
    NoTargets {
        /// The check that was configured.
        kind: CheckKind,
    },

    /// A name or namespace pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A user callback failed.
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}

/// One type under evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateType {
    /// The type.
    pub handle: TypeHandle,
    /// Selected by the last sequence execution.
    pub is_selected: bool,
    /// Verdict of the last dependency check run against this type.
    pub is_passing: bool,
    /// Witness for the verdict.
    pub explanation: Option<String>,
}

impl CandidateType {
    /// Creates an unselected record.
    #[must_use]
    pub fn new(handle: TypeHandle) -> Self {
        Self {
            handle,
            is_selected: false,
            is_passing: false,
            explanation: None,
        }
    }
}

/// The records of one evaluation.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    records: Vec<CandidateType>,
}

impl CandidateSet {
    /// Creates records for the given handles, in order.
    #[must_use]
    pub fn new(handles: impl IntoIterator<Item = TypeHandle>) -> Self {
        Self {
            records: handles.into_iter().map(CandidateType::new).collect(),
        }
    }

    /// Creates records for every type of a provider.
    #[must_use]
    pub fn all(provider: &dyn MetadataProvider) -> Self {
        Self::new(provider.handles())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over records.
    pub fn iter(&self) -> std::slice::Iter<'_, CandidateType> {
        self.records.iter()
    }

    /// Indices of every record.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }

    /// Handles of the selected records.
    #[must_use]
    pub fn selected_handles(&self) -> Vec<TypeHandle> {
        self.records
            .iter()
            .filter(|r| r.is_selected)
            .map(|r| r.handle)
            .collect()
    }
}

impl Index<usize> for CandidateSet {
    type Output = CandidateType;

    fn index(&self, index: usize) -> &CandidateType {
        &self.records[index]
    }
}

impl IndexMut<usize> for CandidateSet {
    fn index_mut(&mut self, index: usize) -> &mut CandidateType {
        &mut self.records[index]
    }
}

/// Read-only state shared by every filter of one evaluation.
#[derive(Clone, Copy)]
pub struct FilterContext<'a> {
    /// Where definitions come from.
    pub provider: &'a dyn MetadataProvider,
    /// Matching options.
    pub options: CheckOptions,
}

impl<'a> FilterContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(provider: &'a dyn MetadataProvider, options: CheckOptions) -> Self {
        Self { provider, options }
    }

    /// Definition of a handle.
    #[must_use]
    pub fn definition(&self, handle: TypeHandle) -> Option<&'a TypeDefinition> {
        self.provider.definition(handle)
    }

    /// Compares two names under the configured case sensitivity.
    #[must_use]
    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        crate::metadata::names_equal(a, b, self.options.case_sensitive)
    }
}

impl std::fmt::Debug for FilterContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterContext")
            .field("types", &self.provider.type_count())
            .field("options", &self.options)
            .finish()
    }
}

/// A filter narrows a list of candidate indices.
///
/// Filters may update `is_passing` and `explanation` of any record they see.
pub type FilterFn = Box<
    dyn Fn(&FilterContext<'_>, &mut CandidateSet, Vec<usize>) -> Result<Vec<usize>, RuleError>
        + Send
        + Sync,
>;

/// Boxes a closure as a [`FilterFn`].
pub fn filter<F>(f: F) -> FilterFn
where
    F: Fn(&FilterContext<'_>, &mut CandidateSet, Vec<usize>) -> Result<Vec<usize>, RuleError>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// Builds a filter keeping candidates whose definition satisfies `f`.
///
/// Candidates without a resolvable definition are dropped.
pub fn predicate<F>(f: F) -> FilterFn
where
    F: Fn(&FilterContext<'_>, &TypeDefinition) -> bool + Send + Sync + 'static,
{
    try_predicate(move |ctx, def| Ok(f(ctx, def)))
}

/// Like [`predicate`] for fallible checks; the first error aborts the filter.
pub fn try_predicate<F>(f: F) -> FilterFn
where
    F: Fn(&FilterContext<'_>, &TypeDefinition) -> Result<bool, RuleError> + Send + Sync + 'static,
{
    filter(move |ctx, set, input| {
        let mut kept = Vec::with_capacity(input.len());
        for index in input {
            if let Some(def) = ctx.definition(set[index].handle) {
                if f(ctx, def)? {
                    kept.push(index);
                }
            }
        }
        Ok(kept)
    })
}

/// Keeps the candidates `inner` rejects.
#[must_use]
pub fn negate(inner: FilterFn) -> FilterFn {
    filter(move |ctx, set, input| {
        let kept = inner(ctx, set, input.clone())?;
        Ok(input.into_iter().filter(|i| !kept.contains(i)).collect())
    })
}

/// Ordered filter groups combined with AND inside a group and OR across groups.
pub struct FunctionSequence {
    groups: Vec<Vec<FilterFn>>,
}

impl Default for FunctionSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<usize> = self.groups.iter().map(Vec::len).collect();
        f.debug_struct("FunctionSequence")
            .field("groups", &sizes)
            .finish()
    }
}

impl FunctionSequence {
    /// Creates a sequence with one empty group.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: vec![Vec::new()],
        }
    }

    /// Appends a filter to the current group.
    pub fn add_filter(&mut self, f: FilterFn) {
        if let Some(group) = self.groups.last_mut() {
            group.push(f);
        }
    }

    /// Starts a new OR group.
    pub fn new_or_group(&mut self) {
        self.groups.push(Vec::new());
    }

    /// Whether no filter has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    /// Number of groups holding at least one filter.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_empty()).count()
    }

    /// Marks and returns the selected candidates, in record order.
    ///
    /// Empty groups are skipped; a sequence without filters selects every
    /// candidate.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a filter.
    pub fn execute(
        &self,
        ctx: &FilterContext<'_>,
        candidates: &mut CandidateSet,
    ) -> Result<Vec<usize>, RuleError> {
        for record in &mut candidates.records {
            record.is_selected = false;
        }

        if self.is_empty() {
            for record in &mut candidates.records {
                record.is_selected = true;
            }
        }

        for group in self.groups.iter().filter(|g| !g.is_empty()) {
            let mut current = candidates.indices();
            for f in group {
                if current.is_empty() {
                    break;
                }
                current = f(ctx, candidates, current)?;
            }
            for index in current {
                candidates[index].is_selected = true;
            }
        }

        Ok(Self::collect(candidates, true))
    }

    /// Returns exactly the candidates [`Self::execute`] leaves unselected.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a filter.
    pub fn execute_inverse(
        &self,
        ctx: &FilterContext<'_>,
        candidates: &mut CandidateSet,
    ) -> Result<Vec<usize>, RuleError> {
        self.execute(ctx, candidates)?;
        Ok(Self::collect(candidates, false))
    }

    fn collect(candidates: &CandidateSet, selected: bool) -> Vec<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_selected == selected)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Whether a condition must hold for every candidate or for none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Every candidate must be selected.
    Should,
    /// No candidate may be selected.
    ShouldNot,
}

impl Polarity {
    fn is_should(self) -> bool {
        self == Self::Should
    }
}

/// Runs a condition sequence over candidates and applies polarity.
///
/// # Errors
///
/// Returns the first error raised by a filter.
pub fn evaluate(
    ctx: &FilterContext<'_>,
    candidates: &mut CandidateSet,
    sequence: &FunctionSequence,
    polarity: Polarity,
) -> Result<TestResult, RuleError> {
    let selected = sequence.execute(ctx, candidates)?;
    let should = polarity.is_should();
    let is_successful = if should {
        selected.len() == candidates.len()
    } else {
        selected.is_empty()
    };
    debug!(
        "Evaluated {} candidate(s), {} selected, polarity {:?}: {}",
        candidates.len(),
        selected.len(),
        polarity,
        if is_successful { "pass" } else { "fail" }
    );

    let failing = candidates.iter().filter(|r| r.is_selected != should);
    Ok(TestResult::new(ctx.provider, candidates.len(), failing))
}
