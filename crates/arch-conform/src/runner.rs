//! Runner for `cargo test` integration.
//!
//! Called by the test function generated with `arch_conform::check!()`, or
//! directly from a hand-written test.

use std::path::{Path, PathBuf};

use arch_conform_core::{Config, Severity, TypeModel};

use crate::declarative::{self, model::DeclarativeConfig};

/// Config file names to search for, in priority order.
const CONFIG_CANDIDATES: &[&str] = &["arch-conform.toml", ".arch-conform.toml"];

/// Checks metadata dumps against the rules in the project config.
///
/// `metadata` is a glob of JSON dumps; without it the `[metadata] paths` of
/// the config are used. Relative paths resolve against the config file's
/// directory, or the project root when no config file exists.
///
/// # Panics
///
/// Panics with a formatted report if violations at or above `fail_on`
/// severity are found, or if configuration, rules or metadata cannot be
/// loaded.
pub fn run_check(metadata: Option<&str>, config_path: Option<&str>) {
    let root = find_project_root();
    let (content, base) = read_config_content(&root, config_path);
    let config = parse_config(&content);
    let fail_on = resolve_fail_on(&config);
    let rules = load_declarative_rules(&content);
    let model = load_model(&base, metadata, &config);

    let report = declarative::check(&rules, &model, &config)
        .unwrap_or_else(|e| panic!("arch-conform: evaluation failed: {e}"));

    if report.has_violations_at(fail_on) {
        let report = report.format_test_report(fail_on);
        panic!("{report}");
    }
}

/// Reads the raw TOML content and the directory it was found in.
///
/// Returns an empty string and `root` if no config file is found.
fn read_config_content(root: &Path, explicit_path: Option<&str>) -> (String, PathBuf) {
    let read = |path: &Path| {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!(
                "arch-conform: failed to read config from {}: {e}",
                path.display()
            );
        });
        let dir = path.parent().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        (content, dir)
    };

    if let Some(path) = explicit_path {
        return read(&resolve(root, path));
    }

    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
        .map_or_else(|| (String::new(), root.to_path_buf()), |path| read(&path))
}

fn resolve(base: &Path, path: &str) -> PathBuf {
    if Path::new(path).is_absolute() {
        PathBuf::from(path)
    } else {
        base.join(path)
    }
}

/// Parses a `Config` from TOML content.
fn parse_config(content: &str) -> Config {
    if content.is_empty() {
        return Config::default();
    }
    Config::parse(content).unwrap_or_else(|e| {
        panic!("arch-conform: failed to parse config: {e}");
    })
}

/// Loads declarative rules from TOML content.
fn load_declarative_rules(content: &str) -> DeclarativeConfig {
    if content.is_empty() {
        return DeclarativeConfig::default();
    }
    declarative::load_rules_from_toml(content)
        .unwrap_or_else(|e| panic!("arch-conform: declarative config error: {e}"))
}

/// Loads the metadata dumps named by the argument or the config.
fn load_model(base: &Path, metadata: Option<&str>, config: &Config) -> TypeModel {
    let patterns: Vec<String> = match metadata {
        Some(pattern) => vec![pattern.to_string()],
        None => config.metadata.paths.clone(),
    };
    assert!(
        !patterns.is_empty(),
        "arch-conform: no metadata configured; pass a glob or set `[metadata] paths`"
    );

    let patterns = patterns
        .iter()
        .map(|p| resolve(base, p).to_string_lossy().into_owned());
    TypeModel::load_glob(patterns)
        .unwrap_or_else(|e| panic!("arch-conform: failed to load metadata: {e}"))
}

/// Checks whether a `Cargo.toml` file defines a `[workspace]` section
/// by parsing as TOML, avoiding false positives from comments or strings.
fn has_workspace_section(cargo_toml: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(cargo_toml) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };
    table.contains_key("workspace")
}

/// Finds the project root: the nearest workspace above `CARGO_MANIFEST_DIR`,
/// else the manifest dir itself, else the current directory.
fn find_project_root() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let manifest_path = PathBuf::from(&manifest_dir);
        return manifest_path
            .ancestors()
            .find(|dir| {
                let cargo_toml = dir.join("Cargo.toml");
                cargo_toml.exists() && has_workspace_section(&cargo_toml)
            })
            .map_or(manifest_path.clone(), Path::to_path_buf);
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolves the effective `fail_on` severity from the config (default "error").
fn resolve_fail_on(config: &Config) -> Severity {
    config
        .fail_on
        .as_deref()
        .map_or(Severity::Error, |name| {
            name.parse().unwrap_or_else(|_| {
                panic!("arch-conform: unknown severity `{name}`. Valid values: error, warning, info")
            })
        })
}
