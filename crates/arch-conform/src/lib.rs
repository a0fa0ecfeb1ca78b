//! # arch-conform
//!
//! Architecture conformance rules over compiled type metadata.
//!
//! This is the main facade crate: it re-exports the engine, the predicate
//! catalogue, and adds the fluent API, declarative TOML rules and the
//! `cargo test` runner.
//!
//! ## Fluent API
//!
//! ```rust,ignore
//! use arch_conform::prelude::*;
//!
//! let model = TypeModel::from_file("build/app.json".as_ref())?;
//! let result = Types::in_model(&model)
//!     .that()
//!     .reside_in_namespace("App.Domain")
//!     .and()
//!     .are_classes()
//!     .should_not()
//!     .have_dependency_on_any(["App.Infrastructure"])
//!     .get_result()?;
//! assert!(result.is_successful, "{:?}", result.failing_names());
//! ```
//!
//! ## Quick Start: `cargo test` Integration
//!
//! ```rust,ignore
//! // tests/architecture.rs
//! arch_conform::check!();
//! ```
//!
//! This checks the dumps listed under `[metadata] paths` against the
//! `[[rules]]` and `[[slices]]` in `arch-conform.toml`. See [`declarative`]
//! for the rule format.

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use arch_conform_core::*;

/// Built-in predicates and the catalogue.
pub mod rules {
    pub use arch_conform_rules::*;
}

pub mod declarative;
mod fluent;
mod runner;

pub use fluent::{
    Conditions, Predicates, SliceConditions, SliceRule, Slices, TypeFilters, Types,
};
pub use runner::run_check;

/// Everything needed to write fluent rules.
pub mod prelude {
    pub use crate::fluent::{Conditions, Predicates, Slices, TypeFilters, Types};
    pub use arch_conform_core::{CheckOptions, RuleError, TestResult, TypeModel};
}

/// Generates a `#[test]` that runs [`run_check`].
///
/// ```rust,ignore
/// arch_conform::check!();
/// arch_conform::check!(metadata = "build/*.json");
/// arch_conform::check!(config = "ci/arch-conform.toml");
/// arch_conform::check!(metadata = "build/*.json", config = "ci/arch-conform.toml");
/// ```
#[macro_export]
macro_rules! check {
    () => {
        $crate::check!(@test None, None);
    };
    (metadata = $metadata:expr $(,)?) => {
        $crate::check!(@test Some($metadata), None);
    };
    (config = $config:expr $(,)?) => {
        $crate::check!(@test None, Some($config));
    };
    (metadata = $metadata:expr, config = $config:expr $(,)?) => {
        $crate::check!(@test Some($metadata), Some($config));
    };
    (@test $metadata:expr, $config:expr) => {
        #[test]
        fn arch_conform_check() {
            $crate::run_check($metadata, $config);
        }
    };
}
