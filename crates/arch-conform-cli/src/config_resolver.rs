//! Configuration lookup and loading.
//!
//! The configuration file is found in this order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `{project}/arch-conform.toml` or `.arch-conform.toml`
//! 3. `$ARCH_CONFORM_CONFIG_DIR/config.toml`, else `~/.arch-conform/config.toml`
//! 4. No config found → defaults
//!
//! One file carries both the base [`Config`] and the declarative rules.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arch_conform::declarative::{self, model::DeclarativeConfig};
use arch_conform_core::Config;

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// A loaded configuration file.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Where it came from.
    pub source: ConfigSource,
    /// Base settings.
    pub config: Config,
    /// Validated `[[rules]]` and `[[slices]]`.
    pub rules: DeclarativeConfig,
    /// Directory that relative `[metadata] paths` resolve against.
    pub base_dir: PathBuf,
}

const PROJECT_CONFIG_NAMES: &[&str] = &["arch-conform.toml", ".arch-conform.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Finds and loads the configuration for `project_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if the base settings or
/// the declarative rules are invalid.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let source = resolve(project_dir, explicit);
    let Some(path) = source.path() else {
        tracing::debug!("No configuration found, using defaults");
        return Ok(ResolvedConfig {
            source,
            config: Config::default(),
            rules: DeclarativeConfig::default(),
            base_dir: project_dir.to_path_buf(),
        });
    };

    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let rules = declarative::load_rules_from_toml(&content)
        .with_context(|| format!("Invalid rules in {}", path.display()))?;
    let base_dir = path
        .parent()
        .map_or_else(|| project_dir.to_path_buf(), Path::to_path_buf);

    Ok(ResolvedConfig {
        source,
        config,
        rules,
        base_dir,
    })
}

/// Resolves the configuration file path without reading it.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(project_dir, explicit, global_config_dir())
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    if let Some(candidate) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists())
    {
        tracing::debug!("Found project config: {}", candidate.display());
        return ConfigSource::Project(candidate);
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.exists())
        .map_or(ConfigSource::Default, |candidate| {
            tracing::debug!("Found global config: {}", candidate.display());
            ConfigSource::Global(candidate)
        })
}

/// Returns the global config directory: `$ARCH_CONFORM_CONFIG_DIR`, else
/// `~/.arch-conform/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARCH_CONFORM_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".arch-conform"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_wins_and_is_not_checked() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("arch-conform.toml"), "").unwrap();

        let result = resolve_inner(project.path(), Some(Path::new("/missing.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/missing.toml")));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join(".arch-conform.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, None),
            ConfigSource::Project(project.path().join(".arch-conform.toml"))
        );

        fs::write(project.path().join("arch-conform.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, None),
            ConfigSource::Project(project.path().join("arch-conform.toml"))
        );
    }

    #[test]
    fn global_only_without_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_dir = Some(global.path().to_path_buf());

        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Default
        );

        fs::write(global.path().join("config.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(project.path(), None, global_dir.clone()),
            ConfigSource::Global(global.path().join("config.toml"))
        );

        fs::write(project.path().join("arch-conform.toml"), "").unwrap();
        assert!(matches!(
            resolve_inner(project.path(), None, global_dir),
            ConfigSource::Project(_)
        ));
    }

    #[test]
    fn load_reads_settings_and_rules() {
        let project = TempDir::new().unwrap();
        let path = project.path().join("arch-conform.toml");
        fs::write(
            &path,
            r#"
fail_on = "warning"

[metadata]
paths = ["build/*.json"]

[[rules]]
name = "sealed-controllers"
message = "m"
that = [{ predicate = "have-name-ending-with", value = "Controller" }]
should = [{ predicate = "are-sealed" }]
"#,
        )
        .unwrap();

        let resolved = load(project.path(), Some(&path)).unwrap();
        assert_eq!(resolved.config.fail_on.as_deref(), Some("warning"));
        assert_eq!(resolved.rules.len(), 1);
        assert_eq!(resolved.base_dir, project.path());
    }

    #[test]
    fn load_reports_invalid_rules() {
        let project = TempDir::new().unwrap();
        let path = project.path().join("arch-conform.toml");
        fs::write(
            &path,
            "[[rules]]\nname = \"r\"\nmessage = \"m\"\nshould = [{ predicate = \"be-fast\" }]\n",
        )
        .unwrap();

        let err = load(project.path(), Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("unknown predicate `be-fast`"));
    }

    #[test]
    fn config_source_path() {
        let p = PathBuf::from("/tmp/test.toml");
        assert_eq!(ConfigSource::Global(p.clone()).path(), Some(p.as_path()));
        assert!(ConfigSource::Default.path().is_none());
    }
}
