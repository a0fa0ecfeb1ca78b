//! Declarative architecture rules driven by TOML configuration.
//!
//! Rules are written against the predicate catalogue, so anything the fluent
//! API can express with catalogue predicates can live in `arch-conform.toml`.
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! DeclarativeConfig (pure domain model)
//!   ↓ check()
//! ConformanceReport
//! ```
//!
//! # Format
//!
//! ```toml
//! [[rules]]
//! name = "pure-domain"
//! message = "Domain must not depend on the data layer."
//! doc = "docs/adr/0001-layers.md"
//! severity = "error"
//! that = [{ predicate = "reside-in-namespace", value = "App.Domain" }]
//! should-not = [{ predicate = "have-dependency-on-any", values = ["App.Data"] }]
//!
//! [[slices]]
//! name = "modules-are-independent"
//! prefix = "App.Modules"
//! ```
//!
//! A clause `{ predicate = "or" }` opens a new group.

use arch_conform_core::RuleError;
use arch_conform_rules::catalogue::CatalogueError;

mod check;
pub mod config_dto;
pub mod loader;
pub mod model;

pub use check::check;

/// Errors from loading or evaluating declarative rules.
#[derive(Debug, thiserror::Error)]
pub enum DeclarativeError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Domain model validation failed.
    #[error("{0}")]
    Load(#[from] loader::LoadError),

    /// A clause could not be turned into a filter.
    #[error("rule `{rule}`: {source}")]
    Predicate {
        /// Rule name.
        rule: String,
        /// Catalogue error.
        source: CatalogueError,
    },

    /// A filter failed during evaluation.
    #[error("rule `{rule}`: {source}")]
    Evaluation {
        /// Rule name.
        rule: String,
        /// Engine error.
        source: RuleError,
    },
}

/// Parses TOML content into validated declarative rules.
///
/// Returns an empty config if no declarative sections are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or model validation fails.
pub fn load_rules_from_toml(content: &str) -> Result<model::DeclarativeConfig, DeclarativeError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    Ok(loader::load(dto)?)
}
