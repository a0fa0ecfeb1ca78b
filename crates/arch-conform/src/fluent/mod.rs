//! Fluent rule API.
//!
//! ```text
//! Types ──that()──▶ Predicates ──should()/should_not()──▶ Conditions ──get_result()
//!       ──should()─────────────────────────────────────▶ Conditions
//!       ──slice()──▶ Slices ──by_namespace_prefix()──▶ SliceRule ──should()──▶ SliceConditions
//! ```
//!
//! Predicates and conditions share the [`TypeFilters`] vocabulary; bring it
//! into scope with `use arch_conform::prelude::*`.

mod conditions;
mod predicates;
mod slices;

pub use conditions::Conditions;
pub use predicates::Predicates;
pub use slices::{SliceConditions, SliceRule, Slices};

use arch_conform_core::metadata::{MetadataProvider, TypeDefinition};
use arch_conform_core::{negate, CheckOptions, FilterContext, FilterFn, FunctionSequence, Polarity};
use arch_conform_rules as rules;

/// Entry point: the type population of one metadata provider.
#[derive(Clone, Copy)]
pub struct Types<'m> {
    provider: &'m dyn MetadataProvider,
    options: CheckOptions,
}

impl std::fmt::Debug for Types<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Types")
            .field("type_count", &self.provider.type_count())
            .field("options", &self.options)
            .finish()
    }
}

impl<'m> Types<'m> {
    /// Every type declared by `provider`.
    #[must_use]
    pub fn in_model(provider: &'m dyn MetadataProvider) -> Self {
        Self {
            provider,
            options: CheckOptions::default(),
        }
    }

    /// Replaces the matching options.
    #[must_use]
    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    /// Current matching options.
    #[must_use]
    pub fn options(&self) -> CheckOptions {
        self.options
    }

    /// Starts a selection.
    #[must_use]
    pub fn that(self) -> Predicates<'m> {
        Predicates::new(self)
    }

    /// Applies a condition to every type.
    #[must_use]
    pub fn should(self) -> Conditions<'m> {
        Conditions::new(self, FunctionSequence::new(), Polarity::Should)
    }

    /// Applies a negated condition to every type.
    #[must_use]
    pub fn should_not(self) -> Conditions<'m> {
        Conditions::new(self, FunctionSequence::new(), Polarity::ShouldNot)
    }

    /// Groups the types into namespace slices.
    #[must_use]
    pub fn slice(self) -> Slices<'m> {
        Slices::new(self)
    }

    /// Every type, in provider order.
    #[must_use]
    pub fn get_types(&self) -> Vec<&'m TypeDefinition> {
        self.provider
            .handles()
            .into_iter()
            .filter_map(|h| self.provider.definition(h))
            .collect()
    }

    pub(crate) fn context(&self) -> FilterContext<'m> {
        FilterContext::new(self.provider, self.options)
    }

    pub(crate) fn provider(&self) -> &'m dyn MetadataProvider {
        self.provider
    }
}

/// The predicate vocabulary shared by selections and conditions.
///
/// Each method adds one filter to the current group; consecutive filters
/// are combined with AND, and `or()` opens a new group.
#[allow(clippy::return_self_not_must_use)]
pub trait TypeFilters: Sized {
    /// Adds an arbitrary filter.
    fn matching(self, f: FilterFn) -> Self;

    /// Adds the negation of an arbitrary filter.
    fn not_matching(self, f: FilterFn) -> Self {
        self.matching(negate(f))
    }

    /// Simple name equals `name`.
    fn have_name(self, name: impl Into<String>) -> Self {
        self.matching(rules::have_name(name))
    }

    /// Simple name differs from `name`.
    fn do_not_have_name(self, name: impl Into<String>) -> Self {
        self.not_matching(rules::have_name(name))
    }

    /// Simple name starts with `prefix`.
    fn have_name_starting_with(self, prefix: impl Into<String>) -> Self {
        self.matching(rules::have_name_starting_with(prefix))
    }

    /// Simple name does not start with `prefix`.
    fn do_not_have_name_starting_with(self, prefix: impl Into<String>) -> Self {
        self.not_matching(rules::have_name_starting_with(prefix))
    }

    /// Simple name ends with `suffix`.
    fn have_name_ending_with(self, suffix: impl Into<String>) -> Self {
        self.matching(rules::have_name_ending_with(suffix))
    }

    /// Simple name does not end with `suffix`.
    fn do_not_have_name_ending_with(self, suffix: impl Into<String>) -> Self {
        self.not_matching(rules::have_name_ending_with(suffix))
    }

    /// Simple name matches the regular expression.
    fn have_name_matching(self, pattern: impl Into<String>) -> Self {
        self.matching(rules::have_name_matching(pattern))
    }

    /// Simple name does not match the regular expression.
    fn do_not_have_name_matching(self, pattern: impl Into<String>) -> Self {
        self.not_matching(rules::have_name_matching(pattern))
    }

    /// Full name equals `full_name`.
    fn have_full_name(self, full_name: impl Into<String>) -> Self {
        self.matching(rules::have_full_name(full_name))
    }

    /// Namespace is `namespace` or below it.
    fn reside_in_namespace(self, namespace: impl Into<String>) -> Self {
        self.matching(rules::reside_in_namespace(namespace))
    }

    /// Namespace is neither `namespace` nor below it.
    fn do_not_reside_in_namespace(self, namespace: impl Into<String>) -> Self {
        self.not_matching(rules::reside_in_namespace(namespace))
    }

    /// Namespace matches the regular expression.
    fn reside_in_namespace_matching(self, pattern: impl Into<String>) -> Self {
        self.matching(rules::reside_in_namespace_matching(pattern))
    }

    /// Namespace equals `namespace`.
    fn reside_in_namespace_exactly(self, namespace: impl Into<String>) -> Self {
        self.matching(rules::reside_in_namespace_exactly(namespace))
    }

    /// Classes.
    fn are_classes(self) -> Self {
        self.matching(rules::are_classes())
    }

    /// Anything but classes.
    fn are_not_classes(self) -> Self {
        self.not_matching(rules::are_classes())
    }

    /// Interfaces.
    fn are_interfaces(self) -> Self {
        self.matching(rules::are_interfaces())
    }

    /// Anything but interfaces.
    fn are_not_interfaces(self) -> Self {
        self.not_matching(rules::are_interfaces())
    }

    /// Structs.
    fn are_structs(self) -> Self {
        self.matching(rules::are_structs())
    }

    /// Enums.
    fn are_enums(self) -> Self {
        self.matching(rules::are_enums())
    }

    /// Delegates.
    fn are_delegates(self) -> Self {
        self.matching(rules::are_delegates())
    }

    /// Abstract, non-static types.
    fn are_abstract(self) -> Self {
        self.matching(rules::are_abstract())
    }

    /// Types that are not abstract.
    fn are_not_abstract(self) -> Self {
        self.not_matching(rules::are_abstract())
    }

    /// Sealed, non-static types.
    fn are_sealed(self) -> Self {
        self.matching(rules::are_sealed())
    }

    /// Types that are not sealed.
    fn are_not_sealed(self) -> Self {
        self.not_matching(rules::are_sealed())
    }

    /// Static classes.
    fn are_static(self) -> Self {
        self.matching(rules::are_static())
    }

    /// Nested types.
    fn are_nested(self) -> Self {
        self.matching(rules::are_nested())
    }

    /// Top-level types.
    fn are_not_nested(self) -> Self {
        self.not_matching(rules::are_nested())
    }

    /// Publicly visible types.
    fn are_public(self) -> Self {
        self.matching(rules::are_public())
    }

    /// Types not visible outside their assembly.
    fn are_not_public(self) -> Self {
        self.not_matching(rules::are_public())
    }

    /// Generic type definitions.
    fn are_generic(self) -> Self {
        self.matching(rules::are_generic())
    }

    /// Derives from `base`, transitively.
    fn inherit(self, base: impl Into<String>) -> Self {
        self.matching(rules::inherit(base))
    }

    /// Does not derive from `base`.
    fn do_not_inherit(self, base: impl Into<String>) -> Self {
        self.not_matching(rules::inherit(base))
    }

    /// Implements `interface`.
    fn implement_interface(self, interface: impl Into<String>) -> Self {
        self.matching(rules::implement_interface(interface))
    }

    /// Does not implement `interface`.
    fn do_not_implement_interface(self, interface: impl Into<String>) -> Self {
        self.not_matching(rules::implement_interface(interface))
    }

    /// Carries `attribute`.
    fn have_custom_attribute(self, attribute: impl Into<String>) -> Self {
        self.matching(rules::have_custom_attribute(attribute))
    }

    /// Does not carry `attribute`.
    fn do_not_have_custom_attribute(self, attribute: impl Into<String>) -> Self {
        self.not_matching(rules::have_custom_attribute(attribute))
    }

    /// Carries `attribute` or derives from a type that does.
    fn have_custom_attribute_or_inherit(self, attribute: impl Into<String>) -> Self {
        self.matching(rules::have_custom_attribute_or_inherit(attribute))
    }

    /// Readonly fields, no setters, no events.
    fn be_immutable(self) -> Self {
        self.matching(rules::are_immutable())
    }

    /// Every field and property can hold null.
    fn have_only_nullable_members(self) -> Self {
        self.matching(rules::have_only_nullable_members())
    }

    /// No public fields.
    fn have_no_public_fields(self) -> Self {
        self.matching(rules::have_no_public_fields())
    }

    /// A source file name matches the regular expression.
    fn have_source_file_name_matching(self, pattern: impl Into<String>) -> Self {
        self.matching(rules::have_source_file_name_matching(pattern))
    }

    /// A source file path matches the regular expression.
    fn have_source_file_path_matching(self, pattern: impl Into<String>) -> Self {
        self.matching(rules::have_source_file_path_matching(pattern))
    }

    /// More than `lines` distinct source lines.
    fn have_lines_of_code_greater_than(self, lines: usize) -> Self {
        self.matching(rules::have_lines_of_code_greater_than(lines))
    }

    /// At most `lines` distinct source lines.
    fn have_lines_of_code_at_most(self, lines: usize) -> Self {
        self.not_matching(rules::have_lines_of_code_greater_than(lines))
    }

    /// User callback.
    fn meet_custom_rule<F>(self, f: F) -> Self
    where
        F: Fn(&TypeDefinition) -> bool + Send + Sync + 'static,
    {
        self.matching(rules::custom(f))
    }

    /// Fallible user callback; its error aborts the evaluation.
    fn try_meet_custom_rule<F, E>(self, f: F) -> Self
    where
        F: Fn(&TypeDefinition) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        self.matching(rules::try_custom(f))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{layered, names};
    use super::*;

    #[test]
    fn types_lists_everything_in_order() {
        let model = layered();
        let types = Types::in_model(&model);
        assert_eq!(types.get_types().len(), 5);
        assert_eq!(names(&types.get_types())[0], "App.Domain.Order");
    }

    #[test]
    fn options_carry_through() {
        let model = layered();
        let types = Types::in_model(&model).with_options(CheckOptions::new().case_sensitive(true));
        assert!(types.options().case_sensitive);
        let selected = types.that().reside_in_namespace("app.domain").get_types().unwrap();
        assert!(selected.is_empty());
    }
}
