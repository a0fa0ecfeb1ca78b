//! Metadata providers and the in-memory [`TypeModel`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::definition::TypeDefinition;

/// Opaque handle of one declared type within a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeHandle(pub usize);

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of type metadata consumed by the engine.
///
/// Handles are dense: a provider with `n` types hands out `TypeHandle(0)`
/// through `TypeHandle(n - 1)`, in a stable order without duplicates.
pub trait MetadataProvider: Send + Sync {
    /// Number of declared types.
    fn type_count(&self) -> usize;

    /// Returns the definition behind a handle.
    fn definition(&self, handle: TypeHandle) -> Option<&TypeDefinition>;

    /// Resolves a full type name (`Namespace.Outer/Inner`) to its handle.
    fn resolve(&self, full_name: &str) -> Option<TypeHandle>;

    /// All handles, in provider order.
    fn handles(&self) -> Vec<TypeHandle> {
        (0..self.type_count()).map(TypeHandle).collect()
    }

    /// Resolves a full name straight to its definition.
    fn resolve_definition(&self, full_name: &str) -> Option<&TypeDefinition> {
        self.resolve(full_name).and_then(|h| self.definition(h))
    }
}

/// Errors loading metadata dumps.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error reading a dump.
    #[error("Failed to read metadata file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The dump is not valid JSON for the metadata schema.
    #[error("Failed to parse metadata{}: {source}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Parse {
        /// Path of the dump, when loaded from disk.
        path: Option<PathBuf>,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Invalid glob pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// A glob matched nothing.
    #[error("No metadata files match `{0}`")]
    NoMatches(String),
}

/// On-disk shape of a metadata dump.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ModelDocument {
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

/// In-memory provider over a list of type definitions.
///
/// Duplicate full names are collapsed on construction; the first definition
/// wins.
#[derive(Debug, Clone, Default)]
pub struct TypeModel {
    types: Vec<TypeDefinition>,
    by_name: HashMap<String, TypeHandle>,
}

impl TypeModel {
    /// Creates a model from definitions.
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = TypeDefinition>) -> Self {
        let mut model = Self::default();
        model.extend(definitions);
        model
    }

    /// Adds definitions, skipping full names already present.
    pub fn extend(&mut self, definitions: impl IntoIterator<Item = TypeDefinition>) {
        for definition in definitions {
            let full_name = definition.full_name();
            if self.by_name.contains_key(&full_name) {
                warn!("Skipping duplicate type definition: {}", full_name);
                continue;
            }
            let handle = TypeHandle(self.types.len());
            self.by_name.insert(full_name, handle);
            self.types.push(definition);
        }
    }

    /// Parses a JSON dump of the form `{ "types": [ ... ] }`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the metadata schema.
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        let document: ModelDocument =
            serde_json::from_str(content).map_err(|e| LoadError::Parse {
                path: None,
                source: e,
            })?;
        Ok(Self::new(document.types))
    }

    /// Loads a JSON dump from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let mut model = Self::default();
        model.load_file(path)?;
        Ok(model)
    }

    /// Loads and merges every dump matched by the glob patterns, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid or matches nothing, or if a
    /// matched file cannot be loaded.
    pub fn load_glob<I, S>(patterns: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut model = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let mut matched = false;
            for entry in glob::glob(pattern)? {
                let path = entry.map_err(|e| LoadError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;
                model.load_file(&path)?;
                matched = true;
            }
            if !matched {
                return Err(LoadError::NoMatches(pattern.to_string()));
            }
        }
        Ok(model)
    }

    fn load_file(&mut self, path: &Path) -> Result<(), LoadError> {
        debug!("Loading metadata: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: ModelDocument =
            serde_json::from_str(&content).map_err(|e| LoadError::Parse {
                path: Some(path.to_path_buf()),
                source: e,
            })?;
        self.extend(document.types);
        Ok(())
    }

    /// Serializes the model back into the dump format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            types: &'a [TypeDefinition],
        }
        serde_json::to_string_pretty(&Borrowed { types: &self.types })
    }

    /// Iterates over handles and definitions.
    pub fn iter(&self) -> impl Iterator<Item = (TypeHandle, &TypeDefinition)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, d)| (TypeHandle(i), d))
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the model holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl MetadataProvider for TypeModel {
    fn type_count(&self) -> usize {
        self.types.len()
    }

    fn definition(&self, handle: TypeHandle) -> Option<&TypeDefinition> {
        self.types.get(handle.0)
    }

    fn resolve(&self, full_name: &str) -> Option<TypeHandle> {
        self.by_name.get(full_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DUMP: &str = r#"{
        "types": [
            { "namespace": "App.Core", "name": "Order", "base": "System.Object" },
            { "namespace": "App.Core", "name": "Order/Line" }
        ]
    }"#;

    #[test]
    fn resolves_by_full_name() {
        let model = TypeModel::from_json(DUMP).unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.resolve("App.Core.Order"), Some(TypeHandle(0)));
        assert_eq!(model.resolve("App.Core.Order/Line"), Some(TypeHandle(1)));
        assert_eq!(model.resolve("App.Core.Missing"), None);
        assert_eq!(model.handles(), vec![TypeHandle(0), TypeHandle(1)]);
    }

    #[test]
    fn duplicates_collapse_to_first_definition() {
        let first = TypeDefinition::class("App", "A");
        let mut second = TypeDefinition::class("App", "A");
        second.is_sealed = true;
        let model = TypeModel::new([first, second]);
        assert_eq!(model.len(), 1);
        assert!(!model.resolve_definition("App.A").unwrap().is_sealed);
    }

    #[test]
    fn load_glob_merges_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.json"), DUMP).unwrap();
        fs::write(
            tmp.path().join("b.json"),
            r#"{ "types": [ { "namespace": "App.Data", "name": "Repo" } ] }"#,
        )
        .unwrap();

        let pattern = format!("{}/*.json", tmp.path().display());
        let model = TypeModel::load_glob([pattern]).unwrap();
        assert_eq!(model.len(), 3);
        assert!(model.resolve("App.Data.Repo").is_some());
    }

    #[test]
    fn load_glob_without_matches_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let pattern = format!("{}/*.json", tmp.path().display());
        assert!(matches!(
            TypeModel::load_glob([pattern]),
            Err(LoadError::NoMatches(_))
        ));
    }

    #[test]
    fn parse_error_mentions_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = TypeModel::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn json_round_trip_preserves_types() {
        let model = TypeModel::from_json(DUMP).unwrap();
        let again = TypeModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(again.len(), model.len());
        assert_eq!(
            again.resolve_definition("App.Core.Order").unwrap().base,
            model.resolve_definition("App.Core.Order").unwrap().base
        );
    }
}
