//! # arch-conform-rules
//!
//! Built-in type predicates for arch-conform.
//!
//! Every predicate is a constructor returning a core [`FilterFn`], usable
//! both to select types (`that()`) and as a condition (`should()`).
//!
//! ## Available Predicates
//!
//! | Category | Predicates |
//! |----------|------------|
//! | naming | `have_name`, `have_name_starting_with`, `have_name_ending_with`, `have_name_matching`, `have_full_name`, `reside_in_namespace`, `reside_in_namespace_matching`, `reside_in_namespace_exactly` |
//! | modifiers | `are_classes`, `are_interfaces`, `are_structs`, `are_enums`, `are_delegates`, `are_abstract`, `are_sealed`, `are_static`, `are_nested`, `are_public`, `are_generic` |
//! | inheritance | `inherit`, `implement_interface`, `have_custom_attribute`, `have_custom_attribute_or_inherit` |
//! | members | `are_immutable`, `have_only_nullable_members`, `have_no_public_fields` |
//! | source | `have_source_file_name_matching`, `have_source_file_path_matching`, `have_lines_of_code_greater_than` |
//! | callbacks | `custom`, `try_custom` |
//!
//! [`catalogue`] maps kebab-case names to the same constructors for rule
//! files and the CLI.
//!
//! ## Usage
//!
//! ```ignore
//! use arch_conform_core::FunctionSequence;
//! use arch_conform_rules::{have_name_ending_with, reside_in_namespace};
//!
//! let mut selection = FunctionSequence::new();
//! selection.add_filter(reside_in_namespace("App.Services"));
//! selection.add_filter(have_name_ending_with("Service"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalogue;
mod custom;
mod inheritance;
mod members;
mod modifiers;
mod naming;
mod pattern;
mod source;

pub use custom::{custom, try_custom};
pub use inheritance::{
    have_custom_attribute, have_custom_attribute_or_inherit, implement_interface, inherit,
};
pub use members::{are_immutable, have_no_public_fields, have_only_nullable_members};
pub use modifiers::{
    are_abstract, are_classes, are_delegates, are_enums, are_generic, are_interfaces, are_nested,
    are_public, are_sealed, are_static, are_structs,
};
pub use naming::{
    have_full_name, have_name, have_name_ending_with, have_name_matching, have_name_starting_with,
    reside_in_namespace, reside_in_namespace_exactly, reside_in_namespace_matching,
};
pub use source::{
    have_lines_of_code_greater_than, have_source_file_name_matching,
    have_source_file_path_matching, lines_of_code,
};

/// Re-export core types for convenience.
pub use arch_conform_core::{FilterFn, RuleError};

#[cfg(test)]
pub(crate) mod test_support {
    use arch_conform_core::metadata::{MetadataProvider, TypeModel};
    use arch_conform_core::{
        CandidateSet, CheckOptions, FilterContext, FilterFn, FunctionSequence, RuleError,
    };

    pub fn try_selected_with(
        model: &TypeModel,
        f: FilterFn,
        options: CheckOptions,
    ) -> Result<Vec<String>, RuleError> {
        let ctx = FilterContext::new(model, options);
        let mut sequence = FunctionSequence::new();
        sequence.add_filter(f);
        let mut set = CandidateSet::all(model);
        let selected = sequence.execute(&ctx, &mut set)?;
        Ok(selected
            .into_iter()
            .filter_map(|i| model.definition(set[i].handle))
            .map(|d| d.full_name())
            .collect())
    }

    pub fn try_selected(model: &TypeModel, f: FilterFn) -> Result<Vec<String>, RuleError> {
        try_selected_with(model, f, CheckOptions::default())
    }

    pub fn selected_with(model: &TypeModel, f: FilterFn, options: CheckOptions) -> Vec<String> {
        try_selected_with(model, f, options).unwrap()
    }

    pub fn selected(model: &TypeModel, f: FilterFn) -> Vec<String> {
        selected_with(model, f, CheckOptions::default())
    }
}
