//! Bootstrap loader for settings files and environment variables.
//!
//! Responsibilities:
//! - Load bootstrap settings from `.env` files, environment variables, and a JSON settings file.
//! - Provide a builder-pattern `BootstrapLoader` for layered configuration merging.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - The decision procedures themselves (see `debug_mode` and `environment`).
//!
//! Invariants / Assumptions:
//! - Environment variables take precedence over settings file values.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod settings;

pub use builder::BootstrapLoader;
pub use env::env_var_or_none;
pub use settings::{
    BootstrapSettings, DeveloperEntry, EnvironmentSettings, RuleEntry, read_settings_file,
};
