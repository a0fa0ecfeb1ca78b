//! Evaluation results.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};

use crate::metadata::{MetadataProvider, TypeHandle};
use crate::sequence::CandidateType;

/// A type that did not conform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailingType {
    /// Handle within the evaluated provider.
    pub handle: TypeHandle,
    /// Full name of the type.
    pub full_name: String,
    /// Why the type failed, when a check recorded a witness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Whether every candidate conformed.
    pub is_successful: bool,
    /// Number of candidates the condition was applied to.
    pub checked: usize,
    /// Non-conforming types, in candidate order.
    pub failing_types: Vec<FailingType>,
}

impl TestResult {
    /// Builds a result from failing records.
    #[must_use]
    pub fn new<'r>(
        provider: &dyn MetadataProvider,
        checked: usize,
        failing: impl IntoIterator<Item = &'r CandidateType>,
    ) -> Self {
        let failing_types: Vec<FailingType> = failing
            .into_iter()
            .map(|record| FailingType {
                handle: record.handle,
                full_name: provider
                    .definition(record.handle)
                    .map_or_else(|| record.handle.to_string(), |d| d.full_name()),
                explanation: record.explanation.clone(),
            })
            .collect();
        Self {
            is_successful: failing_types.is_empty(),
            checked,
            failing_types,
        }
    }

    /// A passing result over `checked` candidates.
    #[must_use]
    pub fn success(checked: usize) -> Self {
        Self {
            is_successful: true,
            checked,
            failing_types: Vec::new(),
        }
    }

    /// Folds another result into this one.
    pub fn merge(&mut self, other: Self) {
        self.is_successful &= other.is_successful;
        self.checked += other.checked;
        self.failing_types.extend(other.failing_types);
    }

    /// Full names of the failing types.
    #[must_use]
    pub fn failing_names(&self) -> Vec<&str> {
        self.failing_types
            .iter()
            .map(|t| t.full_name.as_str())
            .collect()
    }

    /// `(full name, explanation)` for every failing type with a witness.
    pub fn explanations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failing_types.iter().filter_map(|t| {
            t.explanation
                .as_deref()
                .map(|why| (t.full_name.as_str(), why))
        })
    }

    /// One diagnostic per failing type.
    #[must_use]
    pub fn diagnostics(&self, message: &str) -> Vec<FailureDiagnostic> {
        self.failing_types
            .iter()
            .map(|t| FailureDiagnostic::new(t, message))
            .collect()
    }
}

/// Renders a failing type through miette.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{full_name}: {message}")]
#[diagnostic(code(arch_conform::nonconforming_type))]
pub struct FailureDiagnostic {
    full_name: String,
    message: String,
    #[help]
    help: Option<String>,
}

impl FailureDiagnostic {
    /// Wraps a failing type with the violated rule's message.
    #[must_use]
    pub fn new(failing: &FailingType, message: &str) -> Self {
        Self {
            full_name: failing.full_name.clone(),
            message: message.to_string(),
            help: failing.explanation.clone(),
        }
    }
}
