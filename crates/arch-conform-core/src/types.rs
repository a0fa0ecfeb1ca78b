//! Rule-level reporting: severities, violations, run reports.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};

/// Severity level of a rule.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}`")),
        }
    }
}

/// One type breaking one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule name (e.g., "domain-isolation").
    pub rule: String,
    /// Severity of the rule.
    pub severity: Severity,
    /// Full name of the offending type.
    pub type_name: String,
    /// The rule's message.
    pub message: String,
    /// Witness recorded by the check, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Reference to a design document (e.g., "ARCHITECTURE.md L85").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            type_name: type_name.into(),
            message: message.into(),
            explanation: None,
            doc_ref: None,
        }
    }

    /// Attaches the check's witness.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation;
        self
    }

    /// Adds a design document reference to this violation.
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {}\n", self.rule, self.type_name);
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(explanation) = &self.explanation {
            let _ = writeln!(output, "  = note: {explanation}");
        }
        if let Some(doc_ref) = &self.doc_ref {
            let _ = writeln!(output, "  = see: {doc_ref}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.type_name, self.severity, self.rule, self.message
        )?;
        if let Some(explanation) = &self.explanation {
            write!(f, " ({explanation})")?;
        }
        if let Some(doc_ref) = &self.doc_ref {
            write!(f, " (see: {doc_ref})")?;
        }
        Ok(())
    }
}

/// Renders a violation through miette.
#[derive(Debug, thiserror::Error)]
#[error("[{rule}] {type_name}: {message}")]
pub struct ViolationDiagnostic {
    rule: String,
    type_name: String,
    message: String,
    help: Option<String>,
    severity: miette::Severity,
}

impl Diagnostic for ViolationDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(format!("arch_conform::{}", self.rule)))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        let help = match (&v.explanation, &v.doc_ref) {
            (Some(e), Some(d)) => Some(format!("{e}; see {d}")),
            (Some(e), None) => Some(e.clone()),
            (None, Some(d)) => Some(format!("see {d}")),
            (None, None) => None,
        };
        Self {
            rule: v.rule.clone(),
            type_name: v.type_name.clone(),
            message: v.message.clone(),
            help,
            severity: match v.severity {
                Severity::Info => miette::Severity::Advice,
                Severity::Warning => miette::Severity::Warning,
                Severity::Error => miette::Severity::Error,
            },
        }
    }
}

/// Outcome of checking a set of rules.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of rules evaluated.
    pub rules_checked: usize,
    /// Number of types in the checked model.
    pub types_checked: usize,
}

impl ConformanceReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }

    /// Counts violations as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.violations.iter().filter(|v| v.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Formats violations as a test failure report.
    ///
    /// Produces a multi-line report suitable for `panic!()` messages in
    /// `cargo test` integration.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Violation> = self
            .violations
            .iter()
            .filter(|v| v.severity >= fail_on)
            .collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== arch-conform: {} violation(s) ===\n",
            failing.len()
        );
        for v in &failing {
            let _ = writeln!(report, "{}", v.format());
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {errors} error(s), {warnings} warning(s), {infos} info(s) across {} rule(s) and {} type(s)",
            self.rules_checked, self.types_checked
        );

        report
    }

    /// Adds violations from another report.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.rules_checked += other.rules_checked;
        self.types_checked = self.types_checked.max(other.types_checked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "domain-isolation",
            severity,
            "App.Domain.Order",
            "domain must not depend on infrastructure",
        )
    }

    #[test]
    fn violation_format_includes_explanation_and_doc_ref() {
        let v = make_violation(Severity::Error)
            .with_explanation(Some("has a dependency on App.Infra.Db".into()))
            .with_doc_ref("ARCHITECTURE.md L85");
        let formatted = v.format();
        assert!(formatted.contains("= note: has a dependency on App.Infra.Db"));
        assert!(formatted.contains("= see: ARCHITECTURE.md L85"));
    }

    #[test]
    fn violation_display_omits_missing_parts() {
        let display = format!("{}", make_violation(Severity::Warning));
        assert_eq!(
            display,
            "App.Domain.Order: warning [domain-isolation] domain must not depend on infrastructure"
        );
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
        assert_eq!(Severity::default(), Severity::Error);
    }

    #[test]
    fn has_violations_at_respects_threshold() {
        let mut report = ConformanceReport::new();
        report.violations.push(make_violation(Severity::Warning));
        assert!(!report.has_violations_at(Severity::Error));
        assert!(report.has_violations_at(Severity::Warning));
        assert!(!report.has_errors());
    }

    #[test]
    fn format_test_report_filters_by_severity() {
        let mut report = ConformanceReport::new();
        report.rules_checked = 2;
        report.types_checked = 10;
        report.violations.push(make_violation(Severity::Warning));
        report.violations.push(make_violation(Severity::Error));

        let text = report.format_test_report(Severity::Error);
        assert!(text.contains("1 violation(s)"));
        assert!(text.contains("1 error(s), 1 warning(s), 0 info(s)"));
        assert!(text.contains("2 rule(s) and 10 type(s)"));
    }

    #[test]
    fn diagnostic_maps_severity() {
        let v = make_violation(Severity::Info).with_doc_ref("DDD.md");
        let diagnostic = ViolationDiagnostic::from(&v);
        assert_eq!(diagnostic.severity(), Some(miette::Severity::Advice));
        assert_eq!(diagnostic.help().map(|h| h.to_string()).as_deref(), Some("see DDD.md"));
    }
}
