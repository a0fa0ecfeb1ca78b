//! Named lookup of every predicate, for rule files and the CLI.
//!
//! Names are kebab-case. Any predicate can be negated with a `not-` prefix
//! (`not-reside-in-namespace`).

use arch_conform_core::{dependency_filter, negate, CheckKind, FilterFn};

use crate::{inheritance, members, modifiers, naming, source};

/// What a predicate expects as its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    /// No argument.
    None,
    /// One string (`value = "..."`).
    Value,
    /// A non-negative number (`value = "..."`).
    Number,
    /// A list of strings (`values = [...]`); a single `value` is accepted too.
    Values,
}

/// Catalogue entry.
#[derive(Debug, Clone, Copy)]
pub struct PredicateInfo {
    /// Kebab-case name.
    pub name: &'static str,
    /// Group shown by `list-predicates`.
    pub category: &'static str,
    /// Expected argument.
    pub argument: Argument,
    /// One-line description.
    pub description: &'static str,
}

const fn entry(
    name: &'static str,
    category: &'static str,
    argument: Argument,
    description: &'static str,
) -> PredicateInfo {
    PredicateInfo {
        name,
        category,
        argument,
        description,
    }
}

/// Every predicate, grouped by category.
pub const PREDICATES: &[PredicateInfo] = &[
    entry("have-name", "naming", Argument::Value, "Simple name equals the value"),
    entry("have-name-starting-with", "naming", Argument::Value, "Simple name starts with the value"),
    entry("have-name-ending-with", "naming", Argument::Value, "Simple name ends with the value"),
    entry("have-name-matching", "naming", Argument::Value, "Simple name matches a regular expression"),
    entry("have-full-name", "naming", Argument::Value, "Full name equals the value"),
    entry("reside-in-namespace", "naming", Argument::Value, "Namespace is the value or below it"),
    entry("reside-in-namespace-matching", "naming", Argument::Value, "Namespace matches a regular expression"),
    entry("reside-in-namespace-exactly", "naming", Argument::Value, "Namespace equals the value"),
    entry("are-classes", "modifiers", Argument::None, "Classes"),
    entry("are-interfaces", "modifiers", Argument::None, "Interfaces"),
    entry("are-structs", "modifiers", Argument::None, "Structs"),
    entry("are-enums", "modifiers", Argument::None, "Enums"),
    entry("are-delegates", "modifiers", Argument::None, "Delegates"),
    entry("are-abstract", "modifiers", Argument::None, "Abstract, non-static types"),
    entry("are-sealed", "modifiers", Argument::None, "Sealed, non-static types"),
    entry("are-static", "modifiers", Argument::None, "Static classes"),
    entry("are-nested", "modifiers", Argument::None, "Types declared inside another type"),
    entry("are-public", "modifiers", Argument::None, "Publicly visible types"),
    entry("are-generic", "modifiers", Argument::None, "Generic type definitions"),
    entry("inherit", "inheritance", Argument::Value, "Derives from the type, transitively"),
    entry("implement-interface", "inheritance", Argument::Value, "Implements the interface"),
    entry("have-custom-attribute", "inheritance", Argument::Value, "Carries the attribute"),
    entry("have-custom-attribute-or-inherit", "inheritance", Argument::Value, "Carries the attribute or derives from a type that does"),
    entry("are-immutable", "members", Argument::None, "Readonly fields, no setters, no events"),
    entry("have-only-nullable-members", "members", Argument::None, "Every field and property can hold null"),
    entry("have-no-public-fields", "members", Argument::None, "No public fields"),
    entry("have-source-file-name-matching", "source", Argument::Value, "A source file name matches a regular expression"),
    entry("have-source-file-path-matching", "source", Argument::Value, "A source file path matches a regular expression"),
    entry("have-lines-of-code-greater-than", "source", Argument::Number, "More distinct source lines than the value"),
    entry("have-dependency-on-any", "dependencies", Argument::Values, "Depends on at least one target"),
    entry("have-dependency-on-all", "dependencies", Argument::Values, "Depends on every target"),
    entry("only-have-dependencies-on", "dependencies", Argument::Values, "Depends on nothing outside the targets"),
    entry("only-have-dependencies-on-any", "dependencies", Argument::Values, "Depends on some target and nothing outside them"),
    entry("only-have-dependencies-on-all", "dependencies", Argument::Values, "Depends on every target and nothing outside them"),
    entry("be-used-by", "dependencies", Argument::Values, "Referenced by a type matching the targets"),
];

/// Errors building a predicate by name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// No predicate has this name.
    #[error("unknown predicate `{0}`")]
    Unknown(String),

    /// The predicate needs `value`.
    #[error("predicate `{0}` requires a `value`")]
    MissingValue(String),

    /// `value` is not a number.
    #[error("predicate `{predicate}` expects a number, got `{value}`")]
    InvalidNumber {
        /// Predicate name.
        predicate: String,
        /// Supplied value.
        value: String,
    },
}

/// Looks up a catalogue entry, ignoring a `not-` prefix.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static PredicateInfo> {
    let base = name.strip_prefix("not-").unwrap_or(name);
    PREDICATES.iter().find(|p| p.name == base)
}

/// Builds the named predicate.
///
/// # Errors
///
/// Returns an error for unknown names and missing or malformed arguments.
pub fn build(name: &str, value: Option<&str>, values: &[String]) -> Result<FilterFn, CatalogueError> {
    if let Some(inner) = name.strip_prefix("not-") {
        return build(inner, value, values).map(negate);
    }

    let info = lookup(name).ok_or_else(|| CatalogueError::Unknown(name.to_string()))?;
    let text = || {
        value
            .map(str::to_string)
            .ok_or_else(|| CatalogueError::MissingValue(name.to_string()))
    };
    let targets = || -> Vec<String> {
        if values.is_empty() {
            value.map(str::to_string).into_iter().collect()
        } else {
            values.to_vec()
        }
    };

    let built = match info.name {
        "have-name" => naming::have_name(text()?),
        "have-name-starting-with" => naming::have_name_starting_with(text()?),
        "have-name-ending-with" => naming::have_name_ending_with(text()?),
        "have-name-matching" => naming::have_name_matching(text()?),
        "have-full-name" => naming::have_full_name(text()?),
        "reside-in-namespace" => naming::reside_in_namespace(text()?),
        "reside-in-namespace-matching" => naming::reside_in_namespace_matching(text()?),
        "reside-in-namespace-exactly" => naming::reside_in_namespace_exactly(text()?),
        "are-classes" => modifiers::are_classes(),
        "are-interfaces" => modifiers::are_interfaces(),
        "are-structs" => modifiers::are_structs(),
        "are-enums" => modifiers::are_enums(),
        "are-delegates" => modifiers::are_delegates(),
        "are-abstract" => modifiers::are_abstract(),
        "are-sealed" => modifiers::are_sealed(),
        "are-static" => modifiers::are_static(),
        "are-nested" => modifiers::are_nested(),
        "are-public" => modifiers::are_public(),
        "are-generic" => modifiers::are_generic(),
        "inherit" => inheritance::inherit(text()?),
        "implement-interface" => inheritance::implement_interface(text()?),
        "have-custom-attribute" => inheritance::have_custom_attribute(text()?),
        "have-custom-attribute-or-inherit" => {
            inheritance::have_custom_attribute_or_inherit(text()?)
        }
        "are-immutable" => members::are_immutable(),
        "have-only-nullable-members" => members::have_only_nullable_members(),
        "have-no-public-fields" => members::have_no_public_fields(),
        "have-source-file-name-matching" => source::have_source_file_name_matching(text()?),
        "have-source-file-path-matching" => source::have_source_file_path_matching(text()?),
        "have-lines-of-code-greater-than" => {
            let raw = text()?;
            let lines = raw.trim().parse().map_err(|_| CatalogueError::InvalidNumber {
                predicate: name.to_string(),
                value: raw.clone(),
            })?;
            source::have_lines_of_code_greater_than(lines)
        }
        "have-dependency-on-any" => dependency_filter(CheckKind::AnyOf, targets()),
        "have-dependency-on-all" => dependency_filter(CheckKind::AllOf, targets()),
        "only-have-dependencies-on" => dependency_filter(CheckKind::OnlyAnyOrNone, targets()),
        "only-have-dependencies-on-any" => dependency_filter(CheckKind::OnlyAny, targets()),
        "only-have-dependencies-on-all" => dependency_filter(CheckKind::OnlyAll, targets()),
        "be-used-by" => dependency_filter(CheckKind::UsedBy, targets()),
        other => return Err(CatalogueError::Unknown(other.to_string())),
    };
    Ok(built)
}
