//! Centralized constants for the devgate workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and keep cookie and variable names in one place.

// =============================================================================
// Credentials
// =============================================================================

/// Separator between the slug and the secret (or hash) part of a key.
pub const KEY_SEPARATOR: char = '@';

/// Name of the cookie that carries a developer's secret key.
pub const DEBUG_COOKIE_NAME: &str = "devgate-debug";

/// Length of generated developer passwords.
pub const DEFAULT_PASSWORD_LENGTH: usize = 32;

/// First character of the default password alphabet (`!`).
pub const PASSWORD_ALPHABET_START: u8 = b'!';

/// Last character of the default password alphabet (`~`).
pub const PASSWORD_ALPHABET_END: u8 = b'~';

// =============================================================================
// Environment resolution
// =============================================================================

/// Name of the CLI flag carrying the environment (`--env`).
pub const ENV_FLAG: &str = "env";

// =============================================================================
// Configuration fragments
// =============================================================================

/// Separator between a namespace and its value in a fragment id.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Default directory, relative to the working directory, holding fragments.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default file extension of configuration fragments.
pub const DEFAULT_CONFIG_EXTENSION: &str = "json";

// =============================================================================
// Environment variables
// =============================================================================

/// Path to the bootstrap settings file.
pub const ENV_SETTINGS_PATH: &str = "DEVGATE_SETTINGS_PATH";

/// Explicit debug setting (`true`, `false` or `auto`).
pub const ENV_DEBUG: &str = "DEVGATE_DEBUG";

/// Explicit environment name.
pub const ENV_ENVIRONMENT: &str = "DEVGATE_ENV";

/// Fallback environment name used when nothing else matches.
pub const ENV_DEFAULT_ENVIRONMENT: &str = "DEVGATE_DEFAULT_ENV";

/// Directory holding configuration fragments.
pub const ENV_CONFIG_DIR: &str = "DEVGATE_CONFIG_DIR";

/// When set to `1` or `true`, `.env` files are not loaded.
pub const ENV_DOTENV_DISABLED: &str = "DOTENV_DISABLED";
