//! Selection stage.

use arch_conform_core::metadata::TypeDefinition;
use arch_conform_core::{CandidateSet, FilterFn, FunctionSequence, Polarity, RuleError};

use super::{Conditions, TypeFilters, Types};

/// Narrows the type population before a condition is applied.
#[derive(Debug)]
pub struct Predicates<'m> {
    types: Types<'m>,
    selection: FunctionSequence,
}

impl<'m> Predicates<'m> {
    pub(super) fn new(types: Types<'m>) -> Self {
        Self {
            types,
            selection: FunctionSequence::new(),
        }
    }

    /// Continues the current group.
    #[must_use]
    pub fn and(self) -> Self {
        self
    }

    /// Opens a new group; a type is selected when any group selects it.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.selection.new_or_group();
        self
    }

    /// Requires the condition to hold for every selected type.
    #[must_use]
    pub fn should(self) -> Conditions<'m> {
        Conditions::new(self.types, self.selection, Polarity::Should)
    }

    /// Requires the condition to hold for no selected type.
    #[must_use]
    pub fn should_not(self) -> Conditions<'m> {
        Conditions::new(self.types, self.selection, Polarity::ShouldNot)
    }

    /// The selected types, in provider order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a predicate.
    pub fn get_types(&self) -> Result<Vec<&'m TypeDefinition>, RuleError> {
        let ctx = self.types.context();
        let mut candidates = CandidateSet::all(self.types.provider());
        let selected = self.selection.execute(&ctx, &mut candidates)?;
        Ok(selected
            .into_iter()
            .filter_map(|i| ctx.definition(candidates[i].handle))
            .collect())
    }
}

impl TypeFilters for Predicates<'_> {
    fn matching(mut self, f: FilterFn) -> Self {
        self.selection.add_filter(f);
        self
    }
}
