//! Subcommand implementations.

pub mod check;
pub mod init;
pub mod list_predicates;
pub mod output;
