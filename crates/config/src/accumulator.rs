//! Accumulation of configuration fragments.
//!
//! Responsibilities:
//! - Check that each fragment file exists and remember it, in order, for the
//!   external configuration loader.
//! - Record `namespace/value` fragment ids in a parameter table.
//!
//! Does NOT handle:
//! - Parsing or merging fragment contents.
//!
//! Invariants:
//! - Each namespace is written at most once.
//! - A failed `add` leaves the accumulator unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::constants::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_EXTENSION, NAMESPACE_SEPARATOR};
use crate::error::{BootstrapError, Result};

/// Namespace to value mapping built from fragment ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterTable {
    values: BTreeMap<String, String>,
}

impl ParameterTable {
    /// Value recorded for `namespace`, or `""` when unset.
    pub fn get(&self, namespace: &str) -> &str {
        self.values.get(namespace).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.values.contains_key(namespace)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, namespace: &str, value: &str) -> Result<()> {
        if let Some(existing) = self.values.get(namespace) {
            return Err(BootstrapError::DuplicateNamespace {
                namespace: namespace.to_string(),
                existing: existing.clone(),
                attempted: value.to_string(),
            });
        }
        self.values.insert(namespace.to_string(), value.to_string());
        Ok(())
    }
}

/// The outcome of accumulation: files to hand to the loader, and parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub files: Vec<PathBuf>,
    pub parameters: ParameterTable,
}

/// Collects configuration fragments during bootstrap.
#[derive(Debug, Clone)]
pub struct ConfigAccumulator {
    base_dir: PathBuf,
    extension: String,
    files: Vec<PathBuf>,
    parameters: ParameterTable,
}

impl Default for ConfigAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

impl ConfigAccumulator {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extension: DEFAULT_CONFIG_EXTENSION.to_string(),
            files: Vec::new(),
            parameters: ParameterTable::default(),
        }
    }

    /// File extension appended by [`Self::add_fragment`], without the dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of a fragment under the base directory: `<base>/<id>.<ext>`.
    pub fn fragment_path(&self, fragment_id: &str) -> PathBuf {
        let mut file = fragment_id.to_string();
        if !self.extension.is_empty() {
            file.push('.');
            file.push_str(&self.extension);
        }
        self.base_dir.join(file)
    }

    /// Adds a fragment located under the base directory.
    pub fn add_fragment(&mut self, fragment_id: &str) -> Result<&mut Self> {
        let path = self.fragment_path(fragment_id);
        self.add(fragment_id, path)
    }

    /// Adds a fragment whose file has already been located.
    ///
    /// # Errors
    ///
    /// - `ConfigFileNotFound` if `resolved_path` does not exist.
    /// - `DuplicateNamespace` if the fragment's namespace was already set.
    pub fn add(&mut self, fragment_id: &str, resolved_path: impl Into<PathBuf>) -> Result<&mut Self> {
        let path = resolved_path.into();
        if !path.exists() {
            return Err(BootstrapError::ConfigFileNotFound { path });
        }

        if let Some((namespace, value)) = fragment_id.split_once(NAMESPACE_SEPARATOR) {
            self.parameters.insert(namespace, value)?;
        }

        tracing::debug!(fragment = fragment_id, path = %path.display(), "Added configuration fragment");
        self.files.push(path);
        Ok(self)
    }

    pub fn get(&self, namespace: &str) -> &str {
        self.parameters.get(namespace)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn parameters(&self) -> &ParameterTable {
        &self.parameters
    }

    /// Ends accumulation. The result is read-only.
    pub fn finish(self) -> ResolvedConfig {
        ResolvedConfig {
            files: self.files,
            parameters: self.parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "{}").unwrap();
        }
        dir
    }

    #[test]
    fn test_add_records_namespace_and_file() {
        let dir = setup(&["common.json", "db/prod.json"]);
        let mut acc = ConfigAccumulator::new(dir.path());

        acc.add_fragment("common").unwrap().add_fragment("db/prod").unwrap();

        assert_eq!(acc.get("db"), "prod");
        assert_eq!(acc.get("cache"), "");
        assert_eq!(
            acc.files(),
            &[dir.path().join("common.json"), dir.path().join("db/prod.json")]
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = setup(&[]);
        let mut acc = ConfigAccumulator::new(dir.path());

        let err = acc.add_fragment("db/prod").unwrap_err();
        assert!(
            matches!(err, BootstrapError::ConfigFileNotFound { path } if path == dir.path().join("db/prod.json"))
        );
        assert!(acc.parameters().is_empty());
    }

    #[test]
    fn test_duplicate_namespace_is_fatal() {
        let dir = setup(&["db/prod.json", "db/dev.json"]);
        let mut acc = ConfigAccumulator::new(dir.path());

        acc.add_fragment("db/prod").unwrap();
        let err = acc.add_fragment("db/dev").unwrap_err();

        assert!(matches!(
            err,
            BootstrapError::DuplicateNamespace { ref namespace, ref existing, ref attempted }
                if namespace == "db" && existing == "prod" && attempted == "dev"
        ));
        assert_eq!(acc.get("db"), "prod");
        assert_eq!(acc.files().len(), 1);
    }

    #[test]
    fn test_explicit_path_and_nested_value() {
        let dir = setup(&["anywhere.neon"]);
        let mut acc = ConfigAccumulator::default();

        acc.add("theme/dark/high-contrast", dir.path().join("anywhere.neon"))
            .unwrap();
        assert_eq!(acc.get("theme"), "dark/high-contrast");
    }

    #[test]
    fn test_custom_extension() {
        let acc = ConfigAccumulator::new("/etc/app").with_extension("neon");
        assert_eq!(acc.fragment_path("db/prod"), PathBuf::from("/etc/app/db/prod.neon"));

        let acc = ConfigAccumulator::new("/etc/app").with_extension("");
        assert_eq!(acc.fragment_path("local"), PathBuf::from("/etc/app/local"));
    }

    #[test]
    fn test_finish_serializes_parameters_flat() {
        let dir = setup(&["db/prod.json"]);
        let mut acc = ConfigAccumulator::new(dir.path());
        acc.add_fragment("db/prod").unwrap();

        let resolved = acc.finish();
        let json = serde_json::to_value(&resolved.parameters).unwrap();
        assert_eq!(json, serde_json::json!({ "db": "prod" }));
    }
}
