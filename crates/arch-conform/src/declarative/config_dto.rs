//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative rules.
///
/// Lives next to the base `Config` keys in the same file; unknown keys are
/// ignored by both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Predicate rules.
    #[serde(default)]
    pub rules: Vec<RuleDto>,

    /// Slice independence rules.
    #[serde(default)]
    pub slices: Vec<SliceDto>,
}

/// TOML representation of a `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDto {
    /// Rule name (e.g., "domain-is-persistence-ignorant").
    pub name: String,
    /// Violation message.
    pub message: String,
    /// Document reference.
    #[serde(default)]
    pub doc: Option<String>,
    /// Severity (default: "error").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Selection clauses; empty selects every type.
    #[serde(default)]
    pub that: Vec<ClauseDto>,
    /// Clauses every selected type must satisfy.
    #[serde(default)]
    pub should: Option<Vec<ClauseDto>>,
    /// Clauses no selected type may satisfy.
    #[serde(rename = "should-not", default)]
    pub should_not: Option<Vec<ClauseDto>>,
}

/// One predicate invocation, or an `or` separator.
#[derive(Debug, Clone, Deserialize)]
pub struct ClauseDto {
    /// Catalogue name (`reside-in-namespace`, `not-are-classes`, `or`, ...).
    pub predicate: String,
    /// Single argument.
    #[serde(default)]
    pub value: Option<String>,
    /// List argument for dependency predicates.
    #[serde(default)]
    pub values: Vec<String>,
}

/// TOML representation of a `[[slices]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SliceDto {
    /// Rule name.
    pub name: String,
    /// Namespace prefix whose child segments form the slices.
    pub prefix: String,
    /// Violation message.
    #[serde(default)]
    pub message: Option<String>,
    /// Document reference.
    #[serde(default)]
    pub doc: Option<String>,
    /// Severity (default: "error").
    #[serde(default = "default_severity_str")]
    pub severity: String,
}

fn default_severity_str() -> String {
    "error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_and_slices() {
        let dto: DeclarativeConfigDto = toml::from_str(
            r#"
fail_on = "warning"

[[rules]]
name = "controllers-are-named"
message = "Controllers need the suffix."
that = [{ predicate = "reside-in-namespace", value = "App.Web" }]
should = [{ predicate = "have-name-ending-with", value = "Controller" }]

[[rules]]
name = "domain-is-isolated"
message = "Domain stays pure."
severity = "warning"
should-not = [{ predicate = "have-dependency-on-any", values = ["App.Data", "App.Web"] }]

[[slices]]
name = "modules-are-independent"
prefix = "App.Modules"
"#,
        )
        .unwrap();

        assert_eq!(dto.rules.len(), 2);
        assert_eq!(dto.rules[0].severity, "error");
        assert!(dto.rules[0].should.is_some());
        assert!(dto.rules[1].that.is_empty());
        assert_eq!(
            dto.rules[1].should_not.as_ref().unwrap()[0].values,
            vec!["App.Data", "App.Web"]
        );
        assert_eq!(dto.slices[0].prefix, "App.Modules");
        assert!(dto.slices[0].message.is_none());
    }

    #[test]
    fn empty_document_has_no_rules() {
        let dto: DeclarativeConfigDto = toml::from_str("").unwrap();
        assert!(dto.rules.is_empty());
        assert!(dto.slices.is_empty());
    }
}
