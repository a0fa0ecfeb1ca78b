//! arch-conform CLI tool.
//!
//! Usage:
//! ```bash
//! arch-conform check [OPTIONS] [PATH]
//! arch-conform list-predicates
//! arch-conform init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Architecture conformance checks over compiled type metadata
#[derive(Parser)]
#[command(name = "arch-conform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "ARCH_CONFORM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check metadata dumps against the configured rules
    Check {
        /// Project directory holding the configuration (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Glob of JSON metadata dumps (repeatable; overrides `[metadata] paths`)
        #[arg(short, long)]
        metadata: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,
    },

    /// List the predicates usable in rule files
    ListPredicates {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable diagnostics.
    #[default]
    Text,
    /// JSON report.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            metadata,
            format,
            rules,
        } => {
            let resolved = config_resolver::load(&path, cli.config.as_deref())?;
            let failed = commands::check::run(resolved, &metadata, format, rules.as_deref())?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListPredicates { json } => commands::list_predicates::run(json),
        Commands::Init { force } => commands::init::run(&PathBuf::from("."), force),
    }
}
