//! # arch-conform-core
//!
//! Engine for checking compiled type metadata against architecture rules.
//!
//! This crate provides the two subsystems the rest of the workspace builds on:
//!
//! - the dependency walker: [`TypeCheckingContext`] visits every type
//!   reference reachable from one type's metadata and feeds it to a
//!   [`DependencyStrategy`] built over a [`NamespaceSearchTree`]
//! - the rule composition engine: [`FunctionSequence`] combines filters with
//!   AND inside a group and OR across groups, and [`evaluate`] applies
//!   [`Polarity`] to produce a [`TestResult`]
//!
//! Metadata reaches the engine through [`MetadataProvider`]; [`TypeModel`]
//! is the in-tree provider loaded from JSON dumps.
//!
//! ## Example
//!
//! ```ignore
//! use arch_conform_core::{
//!     dependency_filter, evaluate, CandidateSet, CheckKind, CheckOptions, FilterContext,
//!     FunctionSequence, Polarity, TypeModel,
//! };
//!
//! let model = TypeModel::from_file("build/types.json".as_ref())?;
//! let ctx = FilterContext::new(&model, CheckOptions::default());
//!
//! let mut condition = FunctionSequence::new();
//! condition.add_filter(dependency_filter(CheckKind::AnyOf, ["App.Infrastructure"]));
//!
//! let mut candidates = CandidateSet::all(&model);
//! let result = evaluate(&ctx, &mut candidates, &condition, Polarity::ShouldNot)?;
//! assert!(result.is_successful);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dependency;
mod result;
mod search_tree;
mod sequence;
mod slices;
mod strategy;
mod types;
mod walker;

/// Type metadata and providers.
pub mod metadata;

pub use config::{CheckOptions, Config, ConfigError, MetadataConfig, RuleOverride};
pub use dependency::dependency_filter;
pub use metadata::{LoadError, MetadataProvider, TypeDefinition, TypeHandle, TypeModel, TypeRef};
pub use result::{FailingType, FailureDiagnostic, TestResult};
pub use search_tree::{NamespaceSearchTree, TargetId};
pub use sequence::{
    evaluate, filter, negate, predicate, try_predicate, CandidateSet, CandidateType,
    FilterContext, FilterFn, FunctionSequence, Polarity, RuleError,
};
pub use slices::{Slice, SliceSet};
pub use strategy::{CheckKind, DependencyStrategy};
pub use types::{ConformanceReport, Severity, Violation, ViolationDiagnostic};
pub use walker::TypeCheckingContext;
