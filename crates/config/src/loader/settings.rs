//! Bootstrap settings file.
//!
//! Responsibilities:
//! - Define the JSON shape of a bootstrap settings file.
//! - Read and parse the file.
//!
//! Does NOT handle:
//! - Validating keys, IP patterns or rules (done in builder.rs at build time).
//!
//! Invariants:
//! - Every field is optional; a missing field takes its default.
//! - Parse errors name the file but never echo its contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::debug_mode::{CliDebugPolicy, DebugSetting};
use crate::environment::MatchScope;
use crate::error::{BootstrapError, Result};

/// A developer entry: a public key and whether it bypasses the IP allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeveloperEntry {
    pub public_key: String,
    #[serde(default)]
    pub ip_independent: bool,
}

/// A rule in textual form; patterns starting with `^` are regular expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub pattern: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    pub rules: Vec<RuleEntry>,
    pub regex_scope: MatchScope,
    /// Used when no rule matches (HTTP) or no `--env` is given (CLI).
    pub default: Option<String>,
    pub require_cli_flag: bool,
}

/// Contents of a bootstrap settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapSettings {
    pub debug: DebugSetting,
    pub default_debug: bool,
    pub cli_debug_policy: CliDebugPolicy,
    pub ip_allow_list: Vec<String>,
    pub developers: Vec<DeveloperEntry>,
    pub environment: EnvironmentSettings,
    pub config_dir: Option<PathBuf>,
    pub config_extension: Option<String>,
    /// Environment name to the ordered fragment ids it loads.
    pub environments: BTreeMap<String, Vec<String>>,
}

/// Reads a settings file.
///
/// Relative `config_dir` values are resolved against the file's directory.
pub fn read_settings_file(path: &Path) -> Result<BootstrapSettings> {
    if !path.exists() {
        return Err(BootstrapError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| BootstrapError::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut settings: BootstrapSettings =
        serde_json::from_str(&content).map_err(|source| BootstrapError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(dir) = &settings.config_dir
        && dir.is_relative()
        && let Some(parent) = path.parent()
    {
        settings.config_dir = Some(parent.join(dir));
    }

    tracing::debug!(
        path = %path.display(),
        developers = settings.developers.len(),
        rules = settings.environment.rules.len(),
        "Loaded bootstrap settings"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_gives_defaults() {
        let settings: BootstrapSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, BootstrapSettings::default());
        assert_eq!(settings.debug, DebugSetting::Auto);
        assert_eq!(settings.cli_debug_policy, CliDebugPolicy::StaticDefault);
    }

    #[test]
    fn test_full_settings_parse() {
        let json = r#"{
            "debug": "auto",
            "default_debug": true,
            "cli_debug_policy": "refuse",
            "ip_allow_list": ["127.0.0.1", "10.0.0.0/8"],
            "developers": [{"public_key": "alice@$argon2id$x", "ip_independent": true}],
            "environment": {
                "rules": [{"pattern": "^.*\\.staging\\.", "target": "staging"}],
                "regex_scope": "host",
                "default": "production"
            },
            "environments": {"production": ["common", "db/prod"]}
        }"#;

        let settings: BootstrapSettings = serde_json::from_str(json).unwrap();
        assert!(settings.default_debug);
        assert_eq!(settings.cli_debug_policy, CliDebugPolicy::Refuse);
        assert_eq!(settings.ip_allow_list.len(), 2);
        assert!(settings.developers[0].ip_independent);
        assert_eq!(settings.environment.regex_scope, MatchScope::Host);
        assert_eq!(settings.environment.default.as_deref(), Some("production"));
        assert!(!settings.environment.require_cli_flag);
        assert_eq!(settings.environments["production"], vec!["common", "db/prod"]);
    }

    #[test]
    fn test_relative_config_dir_is_resolved_against_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devgate.json");
        fs::write(&path, r#"{"config_dir": "conf"}"#).unwrap();

        let settings = read_settings_file(&path).unwrap();
        assert_eq!(settings.config_dir, Some(dir.path().join("conf")));
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_settings_file(&missing),
            Err(BootstrapError::ConfigFileNotFound { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            read_settings_file(&broken),
            Err(BootstrapError::SettingsParse { .. })
        ));
    }
}
