//! DTO → Domain model conversion with validation.

use arch_conform_core::{Polarity, Severity};

use super::config_dto::{ClauseDto, DeclarativeConfigDto, RuleDto, SliceDto};
use super::model::{
    Clause, ClauseGroups, DeclarativeConfig, ModelError, PredicateRule, RuleName, SliceRule, OR,
};

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "rules[0].that[1]").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// The `should` and `should-not` fields are both set or both missing.
    #[error("{rule_name}: exactly one of `should` or `should-not` must be set")]
    AmbiguousCondition {
        /// The rule that has the conflict.
        rule_name: String,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warning, info")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Cross-reference errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `DeclarativeConfigDto` to a validated `DeclarativeConfig`.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<DeclarativeConfig, LoadError> {
    let rules = dto
        .rules
        .into_iter()
        .enumerate()
        .map(|(i, r)| convert_rule(r, i))
        .collect::<Result<Vec<_>, _>>()?;

    let slices = dto
        .slices
        .into_iter()
        .enumerate()
        .map(|(i, s)| convert_slice(s, i))
        .collect::<Result<Vec<_>, _>>()?;

    DeclarativeConfig::new(rules, slices).map_err(LoadError::CrossRef)
}

fn convert_rule(dto: RuleDto, index: usize) -> Result<PredicateRule, LoadError> {
    let ctx = format!("rules[{index}]");
    let name = convert_name(&dto.name, &ctx)?;
    let severity = parse_severity(&dto.severity, &ctx)?;
    let selection = convert_clauses(&dto.that, &format!("{ctx}.that"))?;

    let (polarity, condition, field) = match (dto.should, dto.should_not) {
        (Some(clauses), None) => (Polarity::Should, clauses, "should"),
        (None, Some(clauses)) => (Polarity::ShouldNot, clauses, "should-not"),
        _ => {
            return Err(LoadError::AmbiguousCondition {
                rule_name: dto.name,
            })
        }
    };
    let condition = convert_clauses(&condition, &format!("{ctx}.{field}"))?;

    PredicateRule::new(name, dto.message, severity, selection, polarity, condition)
        .map(|rule| rule.with_doc(dto.doc))
        .map_err(|e| LoadError::Validation {
            context: format!("{ctx}.{field}"),
            source: e,
        })
}

fn convert_slice(dto: SliceDto, index: usize) -> Result<SliceRule, LoadError> {
    let ctx = format!("slices[{index}]");
    let name = convert_name(&dto.name, &ctx)?;
    let severity = parse_severity(&dto.severity, &ctx)?;
    SliceRule::new(name, &dto.prefix, dto.message, severity)
        .map(|rule| rule.with_doc(dto.doc))
        .map_err(|e| LoadError::Validation {
            context: format!("{ctx}.prefix"),
            source: e,
        })
}

fn convert_name(name: &str, ctx: &str) -> Result<RuleName, LoadError> {
    RuleName::new(name).map_err(|e| LoadError::Validation {
        context: format!("{ctx}.name"),
        source: e,
    })
}

/// Splits a clause list at `or` separators and validates every clause.
fn convert_clauses(clauses: &[ClauseDto], ctx: &str) -> Result<ClauseGroups, LoadError> {
    if clauses.is_empty() {
        return Ok(ClauseGroups::default());
    }

    let mut groups: Vec<Vec<Clause>> = vec![Vec::new()];
    for (i, dto) in clauses.iter().enumerate() {
        if dto.predicate.eq_ignore_ascii_case(OR) {
            groups.push(Vec::new());
            continue;
        }
        let clause = Clause::new(&dto.predicate, dto.value.clone(), dto.values.clone())
            .map_err(|e| LoadError::Validation {
                context: format!("{ctx}[{i}]"),
                source: e,
            })?;
        if let Some(group) = groups.last_mut() {
            group.push(clause);
        }
    }

    ClauseGroups::new(groups).map_err(|e| LoadError::Validation {
        context: ctx.to_string(),
        source: e,
    })
}

fn parse_severity(s: &str, context: &str) -> Result<Severity, LoadError> {
    s.parse().map_err(|_| LoadError::UnknownSeverity {
        context: context.to_string(),
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(toml: &str) -> Result<DeclarativeConfig, LoadError> {
        load(toml::from_str(toml).unwrap())
    }

    #[test]
    fn or_splits_groups() {
        let config = load_str(
            r#"
[[rules]]
name = "services"
message = "m"
that = [
  { predicate = "reside-in-namespace", value = "App.Services" },
  { predicate = "are-classes" },
  { predicate = "or" },
  { predicate = "have-name-ending-with", value = "Service" },
]
should = [{ predicate = "are-sealed" }]
"#,
        )
        .unwrap();

        let rule = &config.rules()[0];
        assert_eq!(rule.selection().groups().len(), 2);
        assert_eq!(rule.selection().groups()[0].len(), 2);
        assert_eq!(rule.polarity(), Polarity::Should);
        assert_eq!(rule.severity(), Severity::Error);
    }

    #[test]
    fn should_not_and_doc() {
        let config = load_str(
            r#"
[[rules]]
name = "pure-domain"
message = "m"
doc = "docs/adr/0003.md"
severity = "warning"
should-not = [{ predicate = "have-dependency-on-any", values = ["App.Data"] }]
"#,
        )
        .unwrap();

        let rule = &config.rules()[0];
        assert_eq!(rule.polarity(), Polarity::ShouldNot);
        assert_eq!(rule.severity(), Severity::Warning);
        assert_eq!(rule.doc(), Some("docs/adr/0003.md"));
        assert!(rule.selection().is_empty());
    }

    #[test]
    fn both_or_neither_condition_is_ambiguous() {
        let both = r#"
[[rules]]
name = "r"
message = "m"
should = [{ predicate = "are-classes" }]
should-not = [{ predicate = "are-enums" }]
"#;
        assert!(matches!(
            load_str(both),
            Err(LoadError::AmbiguousCondition { .. })
        ));

        let neither = r#"
[[rules]]
name = "r"
message = "m"
"#;
        assert!(matches!(
            load_str(neither),
            Err(LoadError::AmbiguousCondition { .. })
        ));
    }

    #[test]
    fn errors_carry_context() {
        let err = load_str(
            r#"
[[rules]]
name = "r"
message = "m"
should = [{ predicate = "are-classes" }, { predicate = "be-fast" }]
"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "rules[0].should[1]: unknown predicate `be-fast`");

        let err = load_str(
            r#"
[[rules]]
name = "r"
message = "m"
should = [{ predicate = "or" }, { predicate = "are-classes" }]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("rules[0].should: "));
    }

    #[test]
    fn unknown_severity() {
        let err = load_str(
            r#"
[[slices]]
name = "modules"
prefix = "App.Modules"
severity = "critical"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::UnknownSeverity { ref value, .. } if value == "critical"));
    }

    #[test]
    fn duplicate_names_reported_together() {
        let err = load_str(
            r#"
[[rules]]
name = "same"
message = "m"
should = [{ predicate = "are-classes" }]

[[slices]]
name = "same"
prefix = "App"
"#,
        )
        .unwrap_err();
        let LoadError::CrossRef(errors) = err else {
            panic!("expected cross-reference errors");
        };
        assert_eq!(errors.len(), 1);
    }
}
