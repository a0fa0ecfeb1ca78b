//! Pure domain model for declarative rules.
//!
//! This module contains no serde and no I/O. All invariants are enforced at
//! construction time: every clause names a catalogue predicate with usable
//! arguments, and no clause group is empty.

use std::collections::HashSet;
use std::fmt;

use arch_conform_core::{FilterFn, Polarity, Severity};
use arch_conform_rules::catalogue::{self, CatalogueError};

/// Separator opening a new clause group.
pub const OR: &str = "or";

/// Message used by slice rules without one.
pub const DEFAULT_SLICE_MESSAGE: &str = "Slices must not depend on each other.";

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated rule name (non-empty, `[a-z0-9-]` only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleName(String);

impl RuleName {
    /// Creates a new rule name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains invalid characters.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyRuleName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ModelError::InvalidRuleName {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One validated predicate invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    predicate: String,
    value: Option<String>,
    values: Vec<String>,
}

impl Clause {
    /// Creates a clause, checking the name and arguments against the catalogue.
    ///
    /// # Errors
    ///
    /// Returns error for unknown predicates and missing or malformed arguments.
    pub fn new(
        predicate: &str,
        value: Option<String>,
        values: Vec<String>,
    ) -> Result<Self, ModelError> {
        catalogue::build(predicate, value.as_deref(), &values)?;
        Ok(Self {
            predicate: predicate.to_string(),
            value,
            values,
        })
    }

    /// Catalogue name.
    #[must_use]
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Builds the filter this clause names.
    ///
    /// # Errors
    ///
    /// Only fails if the catalogue changed since validation.
    pub fn filter(&self) -> Result<FilterFn, CatalogueError> {
        catalogue::build(&self.predicate, self.value.as_deref(), &self.values)
    }
}

/// Clauses combined with AND inside a group and OR across groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseGroups(Vec<Vec<Clause>>);

impl ClauseGroups {
    /// Wraps pre-split groups.
    ///
    /// # Errors
    ///
    /// Returns error if any group is empty.
    pub fn new(groups: Vec<Vec<Clause>>) -> Result<Self, ModelError> {
        if groups.iter().any(Vec::is_empty) {
            return Err(ModelError::EmptyGroup);
        }
        Ok(Self(groups))
    }

    /// The groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[Vec<Clause>] {
        &self.0
    }

    /// Returns true if there are no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ────────────────────────────────────────────
// Rule types
// ────────────────────────────────────────────

/// A `that ... should ...` rule.
#[derive(Debug, Clone)]
pub struct PredicateRule {
    name: RuleName,
    message: String,
    doc: Option<String>,
    severity: Severity,
    selection: ClauseGroups,
    polarity: Polarity,
    condition: ClauseGroups,
}

impl PredicateRule {
    /// Creates a rule.
    ///
    /// # Errors
    ///
    /// Returns error if the condition has no clauses.
    pub fn new(
        name: RuleName,
        message: String,
        severity: Severity,
        selection: ClauseGroups,
        polarity: Polarity,
        condition: ClauseGroups,
    ) -> Result<Self, ModelError> {
        if condition.is_empty() {
            return Err(ModelError::EmptyCondition {
                rule: name.to_string(),
            });
        }
        Ok(Self {
            name,
            message,
            doc: None,
            severity,
            selection,
            polarity,
            condition,
        })
    }

    /// Attaches a document reference.
    #[must_use]
    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &RuleName {
        &self.name
    }

    /// Violation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Document reference.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Declared severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Selection clauses; empty selects every type.
    #[must_use]
    pub fn selection(&self) -> &ClauseGroups {
        &self.selection
    }

    /// Whether the condition must hold for all or for none.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Condition clauses.
    #[must_use]
    pub fn condition(&self) -> &ClauseGroups {
        &self.condition
    }
}

/// Slices under a prefix must not depend on each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceRule {
    name: RuleName,
    prefix: String,
    message: String,
    doc: Option<String>,
    severity: Severity,
}

impl SliceRule {
    /// Creates a slice rule.
    ///
    /// # Errors
    ///
    /// Returns error if the prefix is empty.
    pub fn new(
        name: RuleName,
        prefix: &str,
        message: Option<String>,
        severity: Severity,
    ) -> Result<Self, ModelError> {
        let prefix = prefix.trim().trim_end_matches('.');
        if prefix.is_empty() {
            return Err(ModelError::EmptyPrefix {
                rule: name.to_string(),
            });
        }
        Ok(Self {
            name,
            prefix: prefix.to_string(),
            message: message.unwrap_or_else(|| DEFAULT_SLICE_MESSAGE.to_string()),
            doc: None,
            severity,
        })
    }

    /// Attaches a document reference.
    #[must_use]
    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &RuleName {
        &self.name
    }

    /// Namespace prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Violation message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Document reference.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Declared severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// Validated set of declarative rules.
#[derive(Debug, Clone, Default)]
pub struct DeclarativeConfig {
    rules: Vec<PredicateRule>,
    slices: Vec<SliceRule>,
}

impl DeclarativeConfig {
    /// Builds the aggregate, rejecting duplicate rule names.
    ///
    /// # Errors
    ///
    /// Returns every cross-reference error found.
    pub fn new(rules: Vec<PredicateRule>, slices: Vec<SliceRule>) -> Result<Self, Vec<ModelError>> {
        let mut seen = HashSet::new();
        let errors: Vec<ModelError> = rules
            .iter()
            .map(PredicateRule::name)
            .chain(slices.iter().map(SliceRule::name))
            .filter(|name| !seen.insert(name.as_str()))
            .map(|name| ModelError::DuplicateRuleName {
                name: name.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(Self { rules, slices })
        } else {
            Err(errors)
        }
    }

    /// Predicate rules.
    #[must_use]
    pub fn rules(&self) -> &[PredicateRule] {
        &self.rules
    }

    /// Slice rules.
    #[must_use]
    pub fn slices(&self) -> &[SliceRule] {
        &self.slices
    }

    /// Returns true if no rules are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.slices.is_empty()
    }

    /// Number of rules of either kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len() + self.slices.len()
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Domain validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Rule name is empty.
    #[error("rule name must not be empty")]
    EmptyRuleName,

    /// Rule name has invalid characters.
    #[error("invalid rule name `{name}`: only [a-z0-9-] allowed")]
    InvalidRuleName {
        /// The invalid name.
        name: String,
    },

    /// Predicate lookup or argument error.
    #[error(transparent)]
    Predicate(#[from] CatalogueError),

    /// An `or` separator with nothing on one side.
    #[error("`or` must separate two non-empty clause groups")]
    EmptyGroup,

    /// The condition has no clauses.
    #[error("rule `{rule}` has an empty condition")]
    EmptyCondition {
        /// The rule.
        rule: String,
    },

    /// Slice prefix is empty.
    #[error("slice rule `{rule}` needs a non-empty prefix")]
    EmptyPrefix {
        /// The rule.
        rule: String,
    },

    /// Two rules share a name.
    #[error("duplicate rule name `{name}`")]
    DuplicateRuleName {
        /// The repeated name.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(predicate: &str, value: &str) -> Clause {
        Clause::new(predicate, Some(value.to_string()), vec![]).unwrap()
    }

    #[test]
    fn rule_name_validation() {
        assert!(RuleName::new("domain-2").is_ok());
        assert_eq!(RuleName::new(""), Err(ModelError::EmptyRuleName));
        assert!(matches!(
            RuleName::new("Domain Rule"),
            Err(ModelError::InvalidRuleName { .. })
        ));
    }

    #[test]
    fn clause_validation_uses_catalogue() {
        assert!(Clause::new("are-classes", None, vec![]).is_ok());
        assert!(Clause::new("not-reside-in-namespace", Some("App".into()), vec![]).is_ok());
        assert_eq!(
            Clause::new("be-fast", None, vec![]),
            Err(ModelError::Predicate(CatalogueError::Unknown("be-fast".into())))
        );
        assert_eq!(
            Clause::new("have-name", None, vec![]),
            Err(ModelError::Predicate(CatalogueError::MissingValue(
                "have-name".into()
            )))
        );
    }

    #[test]
    fn empty_groups_rejected() {
        let a = clause("have-name", "A");
        assert!(ClauseGroups::new(vec![vec![a.clone()]]).is_ok());
        assert_eq!(
            ClauseGroups::new(vec![vec![a], vec![]]),
            Err(ModelError::EmptyGroup)
        );
    }

    #[test]
    fn empty_condition_rejected() {
        let err = PredicateRule::new(
            RuleName::new("r").unwrap(),
            "m".into(),
            Severity::Error,
            ClauseGroups::default(),
            Polarity::Should,
            ClauseGroups::default(),
        )
        .unwrap_err();
        assert_eq!(err, ModelError::EmptyCondition { rule: "r".into() });
    }

    #[test]
    fn slice_prefix_normalised() {
        let rule = SliceRule::new(
            RuleName::new("s").unwrap(),
            "App.Modules.",
            None,
            Severity::Warning,
        )
        .unwrap();
        assert_eq!(rule.prefix(), "App.Modules");
        assert_eq!(rule.message(), DEFAULT_SLICE_MESSAGE);
        assert!(matches!(
            SliceRule::new(RuleName::new("s").unwrap(), " ", None, Severity::Error),
            Err(ModelError::EmptyPrefix { .. })
        ));
    }

    #[test]
    fn duplicate_names_across_kinds() {
        let slice = |name: &str| {
            SliceRule::new(RuleName::new(name).unwrap(), "App", None, Severity::Error).unwrap()
        };
        let errors = DeclarativeConfig::new(vec![], vec![slice("a"), slice("b"), slice("a")])
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ModelError::DuplicateRuleName { name: "a".into() }]
        );
    }
}
