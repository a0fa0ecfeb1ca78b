//! Evaluation of declarative rules into a report.

use arch_conform_core::metadata::MetadataProvider;
use arch_conform_core::{Config, ConformanceReport, Polarity, RuleError, TestResult, Violation};
use arch_conform_rules::catalogue::CatalogueError;
use tracing::{debug, info};

use super::model::{ClauseGroups, DeclarativeConfig, PredicateRule, SliceRule};
use super::DeclarativeError;
use crate::fluent::{Conditions, Predicates, TypeFilters, Types};

/// Evaluates every enabled rule against `provider`.
///
/// Severity overrides and `enabled = false` from `settings.overrides` apply
/// per rule name; matching options come from `settings.options`.
///
/// # Errors
///
/// Returns the first rule that cannot be evaluated.
pub fn check(
    config: &DeclarativeConfig,
    provider: &dyn MetadataProvider,
    settings: &Config,
) -> Result<ConformanceReport, DeclarativeError> {
    let types = Types::in_model(provider).with_options(settings.options);
    let mut report = ConformanceReport::new();
    report.types_checked = provider.type_count();

    for rule in config.rules() {
        let name = rule.name().as_str();
        if !settings.is_rule_enabled(name) {
            debug!("Skipping disabled rule {name}");
            continue;
        }
        let result = evaluate_rule(types, rule).map_err(|e| e.for_rule(name))?;
        let severity = settings.rule_severity(name).unwrap_or(rule.severity());
        push_violations(&mut report, &result, name, severity, rule.message(), rule.doc());
        report.rules_checked += 1;
    }

    for slice in config.slices() {
        let name = slice.name().as_str();
        if !settings.is_rule_enabled(name) {
            debug!("Skipping disabled rule {name}");
            continue;
        }
        let result = evaluate_slices(types, slice).map_err(|e| e.for_rule(name))?;
        let severity = settings.rule_severity(name).unwrap_or(slice.severity());
        push_violations(&mut report, &result, name, severity, slice.message(), slice.doc());
        report.rules_checked += 1;
    }

    info!(
        "Checked {} rule(s) over {} type(s): {} violation(s)",
        report.rules_checked,
        report.types_checked,
        report.violations.len()
    );
    Ok(report)
}

fn evaluate_rule(types: Types<'_>, rule: &PredicateRule) -> Result<TestResult, RuleFailure> {
    let predicates = apply(types.that(), rule.selection(), Predicates::or)?;
    let conditions = match rule.polarity() {
        Polarity::Should => predicates.should(),
        Polarity::ShouldNot => predicates.should_not(),
    };
    let conditions = apply(conditions, rule.condition(), Conditions::or)?;
    Ok(conditions.get_result()?)
}

fn evaluate_slices(types: Types<'_>, rule: &SliceRule) -> Result<TestResult, RuleFailure> {
    Ok(types
        .slice()
        .by_namespace_prefix(rule.prefix())
        .should()
        .not_have_dependencies_between_slices()
        .get_result()?)
}

/// Adds the clause groups to a builder, calling `or` between groups.
fn apply<T: TypeFilters>(
    mut target: T,
    groups: &ClauseGroups,
    or: impl Fn(T) -> T,
) -> Result<T, CatalogueError> {
    for (i, group) in groups.groups().iter().enumerate() {
        if i > 0 {
            target = or(target);
        }
        for clause in group {
            target = target.matching(clause.filter()?);
        }
    }
    Ok(target)
}

fn push_violations(
    report: &mut ConformanceReport,
    result: &TestResult,
    rule: &str,
    severity: arch_conform_core::Severity,
    message: &str,
    doc: Option<&str>,
) {
    debug!(
        "Rule {rule}: {} of {} type(s) failing",
        result.failing_types.len(),
        result.checked
    );
    for failing in &result.failing_types {
        let mut violation = Violation::new(rule, severity, &failing.full_name, message)
            .with_explanation(failing.explanation.clone());
        if let Some(doc) = doc {
            violation = violation.with_doc_ref(doc);
        }
        report.violations.push(violation);
    }
}

enum RuleFailure {
    Predicate(CatalogueError),
    Evaluation(RuleError),
}

impl From<CatalogueError> for RuleFailure {
    fn from(e: CatalogueError) -> Self {
        Self::Predicate(e)
    }
}

impl From<RuleError> for RuleFailure {
    fn from(e: RuleError) -> Self {
        Self::Evaluation(e)
    }
}

impl RuleFailure {
    fn for_rule(self, rule: &str) -> DeclarativeError {
        let rule = rule.to_string();
        match self {
            Self::Predicate(source) => DeclarativeError::Predicate { rule, source },
            Self::Evaluation(source) => DeclarativeError::Evaluation { rule, source },
        }
    }
}
