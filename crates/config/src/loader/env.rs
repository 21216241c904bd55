//! Environment variable parsing for bootstrap configuration.
//!
//! Responsibilities:
//! - Read `DEVGATE_*` environment variables into loader overrides.
//! - Provide a helper for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Loading the settings file (see settings.rs).
//! - Building the final `Bootstrap` (see builder.rs).
//! - .env file loading (handled by BootstrapLoader::load_dotenv).
//!
//! Invariants:
//! - Environment variables take precedence over the settings file.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid values return BootstrapError::InvalidValue.

use std::path::PathBuf;

use super::builder::{BootstrapLoader, Overrides};
use crate::constants::{
    ENV_CONFIG_DIR, ENV_DEBUG, ENV_DEFAULT_ENVIRONMENT, ENV_ENVIRONMENT, ENV_SETTINGS_PATH,
};
use crate::debug_mode::DebugSetting;
use crate::error::{BootstrapError, Result};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut BootstrapLoader) -> Result<()> {
    let mut overrides = Overrides::default();

    if let Some(debug) = env_var_or_none(ENV_DEBUG) {
        let setting: DebugSetting = debug.parse().map_err(|_| BootstrapError::InvalidValue {
            var: ENV_DEBUG.to_string(),
            message: "must be true, false or auto".to_string(),
        })?;
        overrides.debug = Some(setting);
    }
    overrides.environment = env_var_or_none(ENV_ENVIRONMENT);
    overrides.default_environment = env_var_or_none(ENV_DEFAULT_ENVIRONMENT);
    overrides.config_dir = env_var_or_none(ENV_CONFIG_DIR).map(PathBuf::from);

    loader.set_env_overrides(overrides);

    // Settings path from environment (only if not already set via CLI)
    if loader.settings_path().is_none()
        && let Some(path) = env_var_or_none(ENV_SETTINGS_PATH)
    {
        loader.set_settings_path(Some(PathBuf::from(path)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_empty_and_whitespace_strings() {
        let key = "_DEVGATE_TEST_VAR";
        temp_env::with_vars([(key, None::<&str>)], || {
            assert!(env_var_or_none(key).is_none(), "Unset env var should return None");
        });
        temp_env::with_vars([(key, Some(""))], || {
            assert!(env_var_or_none(key).is_none(), "Empty env var should return None");
        });
        temp_env::with_vars([(key, Some("   "))], || {
            assert!(
                env_var_or_none(key).is_none(),
                "Whitespace-only env var should return None"
            );
        });
        temp_env::with_vars([(key, Some(" value "))], || {
            assert_eq!(env_var_or_none(key), Some("value".to_string()));
        });
    }

    #[test]
    #[serial]
    fn test_invalid_debug_value_is_rejected() {
        temp_env::with_vars([(ENV_DEBUG, Some("sometimes"))], || {
            let mut loader = BootstrapLoader::new();
            let err = apply_env(&mut loader).unwrap_err();
            assert!(matches!(err, BootstrapError::InvalidValue { var, .. } if var == ENV_DEBUG));
        });
    }

    #[test]
    #[serial]
    fn test_settings_path_from_env_does_not_override_explicit() {
        temp_env::with_vars([(ENV_SETTINGS_PATH, Some("/from/env.json"))], || {
            let mut loader = BootstrapLoader::new();
            apply_env(&mut loader).unwrap();
            assert_eq!(loader.settings_path(), Some(&PathBuf::from("/from/env.json")));

            let mut loader = BootstrapLoader::new().with_settings_path("/explicit.json".into());
            apply_env(&mut loader).unwrap();
            assert_eq!(loader.settings_path(), Some(&PathBuf::from("/explicit.json")));
        });
    }
}
