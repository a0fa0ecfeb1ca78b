//! Check command implementation.

use anyhow::{bail, Context, Result};
use arch_conform::declarative;
use arch_conform_core::{Severity, TypeModel};
use std::path::Path;

use crate::config_resolver::ResolvedConfig;
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns `true` when violations at or above the `fail_on` threshold
/// (default: error) were found.
pub fn run(
    mut resolved: ResolvedConfig,
    metadata: &[String],
    format: OutputFormat,
    rules_filter: Option<&str>,
) -> Result<bool> {
    let fail_on: Severity = match resolved.config.fail_on.as_deref() {
        Some(name) => name
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("Invalid `fail_on` in config")?,
        None => Severity::Error,
    };

    let patterns = metadata_patterns(&resolved, metadata);
    if patterns.is_empty() {
        bail!("No metadata to check: pass --metadata or set `[metadata] paths` in the config");
    }
    let model = TypeModel::load_glob(&patterns).context("Failed to load metadata")?;

    if let Some(filter) = rules_filter {
        let names: Vec<&str> = filter.split(',').map(str::trim).collect();
        restrict_to(&mut resolved, &names);
    }

    tracing::info!(
        "Checking {} type(s) against {} rule(s)",
        model.len(),
        resolved.rules.len()
    );

    let report = declarative::check(&resolved.rules, &model, &resolved.config)
        .context("Rule evaluation failed")?;

    super::output::print(&report, format)?;

    Ok(report.has_violations_at(fail_on))
}

/// Command-line globs are taken as given; config globs resolve against the
/// config file's directory.
fn metadata_patterns(resolved: &ResolvedConfig, metadata: &[String]) -> Vec<String> {
    if !metadata.is_empty() {
        return metadata.to_vec();
    }
    resolved
        .config
        .metadata
        .paths
        .iter()
        .map(|p| {
            if Path::new(p).is_absolute() {
                p.clone()
            } else {
                resolved.base_dir.join(p).to_string_lossy().into_owned()
            }
        })
        .collect()
}

/// Disables every rule not named in `names`.
fn restrict_to(resolved: &mut ResolvedConfig, names: &[&str]) {
    let declared: Vec<String> = resolved
        .rules
        .rules()
        .iter()
        .map(|r| r.name().to_string())
        .chain(resolved.rules.slices().iter().map(|s| s.name().to_string()))
        .collect();

    for name in names {
        if !declared.iter().any(|d| d == name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    for name in declared {
        if !names.contains(&name.as_str()) {
            resolved
                .config
                .overrides
                .entry(name)
                .or_default()
                .enabled = Some(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_resolver::load;
    use std::fs;
    use tempfile::TempDir;

    const DUMP: &str = r#"{ "types": [
  { "namespace": "App.Web", "name": "HomeController" },
  { "namespace": "App.Web", "name": "SealedController", "is_sealed": true }
] }"#;

    const CONFIG: &str = r#"
[metadata]
paths = ["dumps/*.json"]

[[rules]]
name = "sealed-controllers"
message = "Controllers are leaves."
that = [{ predicate = "have-name-ending-with", value = "Controller" }]
should = [{ predicate = "are-sealed" }]

[[rules]]
name = "web-namespace"
message = "Everything lives under App."
should = [{ predicate = "reside-in-namespace", value = "App" }]
"#;

    fn project(config: &str) -> (TempDir, ResolvedConfig) {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("dumps")).unwrap();
        fs::write(tmp.path().join("dumps/web.json"), DUMP).unwrap();
        let path = tmp.path().join("arch-conform.toml");
        fs::write(&path, config).unwrap();
        let resolved = load(tmp.path(), Some(&path)).unwrap();
        (tmp, resolved)
    }

    #[test]
    fn config_globs_resolve_against_config_dir() {
        let (tmp, resolved) = project(CONFIG);
        let patterns = metadata_patterns(&resolved, &[]);
        assert_eq!(
            patterns,
            vec![tmp.path().join("dumps/*.json").to_string_lossy().into_owned()]
        );
        assert_eq!(metadata_patterns(&resolved, &["x.json".to_string()]), vec!["x.json"]);
    }

    #[test]
    fn error_violations_fail_the_run() {
        let (_tmp, resolved) = project(CONFIG);
        assert!(run(resolved, &[], OutputFormat::Compact, None).unwrap());
    }

    #[test]
    fn rule_filter_disables_others() {
        let (_tmp, resolved) = project(CONFIG);
        assert!(!run(resolved, &[], OutputFormat::Compact, Some("web-namespace")).unwrap());
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let (_tmp, resolved) = project("");
        let err = run(resolved, &[], OutputFormat::Compact, None).unwrap_err();
        assert!(err.to_string().contains("No metadata to check"));
    }

    #[test]
    fn invalid_fail_on_is_an_error() {
        let (_tmp, resolved) = project(&format!("fail_on = \"fatal\"\n{CONFIG}"));
        assert!(run(resolved, &[], OutputFormat::Compact, None).is_err());
    }
}
