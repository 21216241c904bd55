//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map BootstrapError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use devgate_config::BootstrapError;

/// Structured exit codes for devgate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    #[allow(dead_code)]
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Invalid settings - unreadable settings file, bad env var, bad pattern.
    ///
    /// Scripts should fix the configuration and not retry.
    ConfigurationError = 2,

    /// No environment could be determined.
    ///
    /// Scripts should pass `--env` or add a matching rule.
    EnvironmentUnresolved = 3,

    /// A referenced file does not exist.
    NotFound = 4,

    /// Invalid input - malformed key, invalid slug, duplicate registration.
    ValidationError = 5,

    /// Cookie-based debug mode requested where it is not supported.
    UnsupportedMode = 6,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&BootstrapError> for ExitCode {
    fn from(err: &BootstrapError) -> Self {
        match err {
            BootstrapError::MissingEnvironment | BootstrapError::NoEnvironmentMatch { .. } => {
                ExitCode::EnvironmentUnresolved
            }

            BootstrapError::ConfigFileNotFound { .. } => ExitCode::NotFound,

            BootstrapError::MalformedKey
            | BootstrapError::InvalidSlug(_)
            | BootstrapError::DuplicateDeveloper { .. }
            | BootstrapError::InvalidPasswordHash { .. }
            | BootstrapError::DuplicateNamespace { .. }
            | BootstrapError::InvalidAlphabet { .. } => ExitCode::ValidationError,

            BootstrapError::UnsupportedMode => ExitCode::UnsupportedMode,

            BootstrapError::InvalidIpPattern(_)
            | BootstrapError::InvalidRegex { .. }
            | BootstrapError::InvalidValue { .. }
            | BootstrapError::SettingsRead { .. }
            | BootstrapError::SettingsParse { .. }
            | BootstrapError::DotenvParse { .. }
            | BootstrapError::DotenvIo { .. }
            | BootstrapError::DotenvUnknown => ExitCode::ConfigurationError,

            BootstrapError::PasswordHash(_) => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if the error is not a BootstrapError.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<BootstrapError>())
            .map(ExitCode::from)
            .unwrap_or(ExitCode::GeneralError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::EnvironmentUnresolved.as_i32(), 3);
        assert_eq!(ExitCode::UnsupportedMode.as_i32(), 6);
    }

    #[test]
    fn test_bootstrap_error_mapping() {
        assert_eq!(
            ExitCode::from(&BootstrapError::MissingEnvironment),
            ExitCode::EnvironmentUnresolved
        );
        assert_eq!(
            ExitCode::from(&BootstrapError::ConfigFileNotFound {
                path: PathBuf::from("/nope")
            }),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&BootstrapError::DuplicateNamespace {
                namespace: "db".into(),
                existing: "prod".into(),
                attempted: "dev".into(),
            }),
            ExitCode::ValidationError
        );
        assert_eq!(
            ExitCode::from(&BootstrapError::InvalidIpPattern("x".into())),
            ExitCode::ConfigurationError
        );
    }

    #[test]
    fn test_exit_code_found_through_context() {
        let err: anyhow::Error = Err::<(), _>(BootstrapError::MalformedKey)
            .context("while registering developers")
            .unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::ValidationError);

        let plain = anyhow::anyhow!("something else");
        assert_eq!(plain.exit_code(), ExitCode::GeneralError);
    }
}
