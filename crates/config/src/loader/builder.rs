//! Bootstrap loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `BootstrapLoader` that layers the settings
//!   file, environment variables and direct builder calls.
//! - Build the immutable `Bootstrap` context in a single pass.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Settings file parsing (delegated to settings.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables, which take
//!   precedence over the settings file.
//! - Builder rules are evaluated before settings file rules.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::env::{apply_env, env_var_or_none};
use super::settings::{BootstrapSettings, DeveloperEntry, read_settings_file};
use crate::constants::{
    DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_EXTENSION, ENV_DOTENV_DISABLED, ENV_SETTINGS_PATH,
};
use crate::context::Bootstrap;
use crate::credentials::CredentialStore;
use crate::debug_mode::{CliDebugPolicy, DebugModeResolver, DebugSetting};
use crate::environment::{EnvironmentResolver, EnvironmentRule};
use crate::error::Result;
use crate::ip::IpAllowList;

/// Values that override the settings file.
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub debug: Option<DebugSetting>,
    pub environment: Option<String>,
    pub default_environment: Option<String>,
    pub config_dir: Option<PathBuf>,
}

/// Loader that builds a `Bootstrap` from a settings file, environment
/// variables and explicit values.
#[derive(Debug, Default)]
pub struct BootstrapLoader {
    settings_path: Option<PathBuf>,
    settings: BootstrapSettings,
    env_overrides: Overrides,
    overrides: Overrides,
    default_debug: Option<bool>,
    cli_policy: Option<CliDebugPolicy>,
    developers: Vec<DeveloperEntry>,
    ip_allow_list: Vec<String>,
    rules: Vec<EnvironmentRule>,
    fragments: BTreeMap<String, Vec<String>>,
}

impl BootstrapLoader {
    /// Create a new bootstrap loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(ENV_DOTENV_DISABLED).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the `.env` file exists but is invalid or unreadable.
    /// Missing `.env` files are silently ignored.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(dotenvy::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                Ok(self)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read bootstrap settings from environment variables.
    pub fn from_env(mut self) -> Result<Self> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Read the settings file.
    ///
    /// The path comes from [`Self::with_settings_path`] or
    /// `DEVGATE_SETTINGS_PATH`. Without either, nothing is read.
    ///
    /// # Errors
    ///
    /// `ConfigFileNotFound` if a path is configured but does not exist, or a
    /// read/parse error for an invalid file.
    pub fn from_settings_file(mut self) -> Result<Self> {
        let path = self
            .settings_path
            .clone()
            .or_else(|| env_var_or_none(ENV_SETTINGS_PATH).map(PathBuf::from));
        if let Some(path) = path {
            self.settings = read_settings_file(&path)?;
            self.settings_path = Some(path);
        }
        Ok(self)
    }

    /// Use already-parsed settings instead of a file.
    pub fn with_settings(mut self, settings: BootstrapSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the settings file path.
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    /// Set the explicit debug setting.
    pub fn with_debug(mut self, setting: DebugSetting) -> Self {
        self.overrides.debug = Some(setting);
        self
    }

    /// Set the flag used when no cookie mechanism applies.
    pub fn with_default_debug(mut self, default_debug: bool) -> Self {
        self.default_debug = Some(default_debug);
        self
    }

    pub fn with_cli_debug_policy(mut self, policy: CliDebugPolicy) -> Self {
        self.cli_policy = Some(policy);
        self
    }

    /// Set the explicit environment, bypassing CLI flags and URL rules.
    pub fn with_environment(mut self, name: String) -> Self {
        self.overrides.environment = Some(name);
        self
    }

    pub fn with_default_environment(mut self, name: String) -> Self {
        self.overrides.default_environment = Some(name);
        self
    }

    pub fn with_config_dir(mut self, dir: PathBuf) -> Self {
        self.overrides.config_dir = Some(dir);
        self
    }

    /// Register a developer in addition to those in the settings file.
    pub fn add_developer(mut self, public_key: String, ip_independent: bool) -> Self {
        self.developers.push(DeveloperEntry {
            public_key,
            ip_independent,
        });
        self
    }

    /// Add an IP allow-list entry (address or CIDR network).
    pub fn allow_ip(mut self, entry: String) -> Self {
        self.ip_allow_list.push(entry);
        self
    }

    /// Add an environment rule, evaluated before the settings file's rules.
    pub fn add_rule(mut self, rule: EnvironmentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the fragments loaded for `environment`.
    pub fn with_fragments(mut self, environment: String, fragments: Vec<String>) -> Self {
        self.fragments.insert(environment, fragments);
        self
    }

    pub(crate) fn set_env_overrides(&mut self, overrides: Overrides) {
        self.env_overrides = overrides;
    }

    pub(crate) fn settings_path(&self) -> Option<&PathBuf> {
        self.settings_path.as_ref()
    }

    pub(crate) fn set_settings_path(&mut self, path: Option<PathBuf>) {
        self.settings_path = path;
    }

    /// Build the bootstrap context.
    ///
    /// This is the single write pass over the developer registry, allow-list
    /// and rule list; the returned `Bootstrap` is read-only.
    ///
    /// # Errors
    ///
    /// Any invalid public key, duplicate developer, IP pattern or rule
    /// pattern aborts the build.
    pub fn build(self) -> Result<Bootstrap> {
        let BootstrapLoader {
            settings,
            env_overrides,
            overrides,
            default_debug,
            cli_policy,
            developers,
            ip_allow_list,
            rules,
            fragments,
            ..
        } = self;

        let mut credentials = CredentialStore::new();
        for developer in settings.developers.iter().chain(&developers) {
            credentials.add_developer(&developer.public_key, developer.ip_independent)?;
        }

        let allow_list =
            IpAllowList::parse(settings.ip_allow_list.iter().chain(&ip_allow_list))?;

        let mut all_rules = rules;
        for entry in &settings.environment.rules {
            all_rules.push(EnvironmentRule::parse(&entry.pattern, entry.target.clone())?);
        }

        let debug_resolver = DebugModeResolver::new(credentials, allow_list)
            .with_default_debug(default_debug.unwrap_or(settings.default_debug))
            .with_cli_policy(cli_policy.unwrap_or(settings.cli_debug_policy));

        let default_environment = overrides
            .default_environment
            .or(env_overrides.default_environment)
            .or(settings.environment.default);
        let environment_resolver = EnvironmentResolver::new(all_rules)
            .with_scope(settings.environment.regex_scope)
            .with_default_environment(default_environment)
            .with_required_cli_flag(settings.environment.require_cli_flag);

        let debug_setting = overrides
            .debug
            .or(env_overrides.debug)
            .unwrap_or(settings.debug);
        let explicit_environment = overrides.environment.or(env_overrides.environment);
        let config_dir = overrides
            .config_dir
            .or(env_overrides.config_dir)
            .or(settings.config_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR));
        let config_extension = settings
            .config_extension
            .unwrap_or_else(|| DEFAULT_CONFIG_EXTENSION.to_string());

        let mut all_fragments = settings.environments;
        all_fragments.extend(fragments);

        tracing::debug!(
            developers = debug_resolver.credentials().len(),
            rules = environment_resolver.rules().len(),
            debug = %debug_setting,
            "Built bootstrap context"
        );

        Ok(Bootstrap::new(
            debug_resolver,
            environment_resolver,
            debug_setting,
            explicit_environment,
            config_dir,
            config_extension,
            all_fragments,
        ))
    }
}
