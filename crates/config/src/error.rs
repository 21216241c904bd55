//! Error types for the bootstrap core.
//!
//! Responsibilities:
//! - Define one error variant per fatal bootstrap failure.
//! - Carry enough context (slugs, paths, namespaces) to diagnose a failure.
//!
//! Does NOT handle:
//! - Malformed or absent debug cookies. Those resolve to "debug mode off"
//!   and never surface as errors.
//! - Exit code mapping (see the CLI crate).
//!
//! Invariants:
//! - No variant ever carries a password, a secret key or a cookie value.
//! - Dotenv errors NEVER include raw .env line contents.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the bootstrap sequence.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Malformed key: expected 'slug@secret'")]
    MalformedKey,

    #[error("Invalid developer slug '{0}': only 0-9, A-Z, a-z, '.' and '/' are allowed")]
    InvalidSlug(String),

    #[error("Developer '{slug}' is already registered")]
    DuplicateDeveloper { slug: String },

    #[error("Public key for developer '{slug}' does not contain a valid password hash")]
    InvalidPasswordHash { slug: String },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Password alphabet must contain between 1 and 256 ASCII characters (got {len})")]
    InvalidAlphabet { len: usize },

    #[error("Cookie-based debug mode is not supported in CLI mode")]
    UnsupportedMode,

    #[error("Invalid IP pattern '{0}'")]
    InvalidIpPattern(String),

    #[error("Invalid environment rule pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("No environment given. Pass --env <name> or --env=<name>")]
    MissingEnvironment,

    #[error("No environment rule matches '{url}' and no default environment is configured")]
    NoEnvironmentMatch { url: String },

    #[error("Configuration file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error(
        "Configuration namespace '{namespace}' is already set to '{existing}', cannot set it to '{attempted}'"
    )]
    DuplicateNamespace {
        namespace: String,
        existing: String,
        attempted: String,
    },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to read settings file at {path}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file at {path}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a dotenv file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read a dotenv file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

pub type Result<T> = std::result::Result<T, BootstrapError>;

impl From<dotenvy::Error> for BootstrapError {
    fn from(error: dotenvy::Error) -> Self {
        match error {
            dotenvy::Error::LineParse(_, idx) => BootstrapError::DotenvParse { error_index: idx },
            dotenvy::Error::Io(io_err) => BootstrapError::DotenvIo {
                kind: io_err.kind(),
            },
            _ => BootstrapError::DotenvUnknown,
        }
    }
}
