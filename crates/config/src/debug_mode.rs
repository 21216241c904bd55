//! Debug mode decision procedure.
//!
//! Responsibilities:
//! - Combine the explicit setting, runtime mode, developer registry,
//!   IP allow-list and debug cookie into one boolean.
//!
//! Does NOT handle:
//! - Reading the cookie from an HTTP request (the hosting layer passes it in).
//! - Registering developers (see credentials.rs).
//!
//! Invariants:
//! - An explicit `true`/`false` always wins, cookie or not.
//! - A missing or malformed cookie resolves to `false`, never to an error.
//! - The IP check runs before the (slow) password verification.
//! - Resolution is pure: identical inputs give identical results.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::credentials::CredentialStore;
use crate::error::{BootstrapError, Result};
use crate::ip::IpAllowList;
use crate::keys::{split_key, verify_password};

/// Operator-supplied debug setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugSetting {
    Enabled,
    Disabled,
    /// Decide from the debug cookie.
    #[default]
    Auto,
}

impl From<bool> for DebugSetting {
    fn from(value: bool) -> Self {
        if value { Self::Enabled } else { Self::Disabled }
    }
}

impl FromStr for DebugSetting {
    type Err = BootstrapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(Self::Enabled),
            "false" | "0" => Ok(Self::Disabled),
            "auto" => Ok(Self::Auto),
            _ => Err(BootstrapError::InvalidValue {
                var: "debug".to_string(),
                message: "must be true, false or auto".to_string(),
            }),
        }
    }
}

impl fmt::Display for DebugSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "true",
            Self::Disabled => "false",
            Self::Auto => "auto",
        })
    }
}

impl Serialize for DebugSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Enabled => serializer.serialize_bool(true),
            Self::Disabled => serializer.serialize_bool(false),
            Self::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for DebugSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(flag) => Ok(flag.into()),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// How the process was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Cli,
    Http,
}

/// What to do when debug mode is `Auto` in a CLI process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CliDebugPolicy {
    /// Return the static default flag.
    #[default]
    StaticDefault,
    /// Fail with `UnsupportedMode`.
    Refuse,
}

/// Per-request inputs of the decision procedure.
#[derive(Debug, Clone, Copy)]
pub struct DebugRequest<'a> {
    pub mode: RuntimeMode,
    /// Raw value of the debug cookie, if the request carried one.
    pub cookie: Option<&'a str>,
    pub remote_addr: Option<IpAddr>,
}

impl<'a> DebugRequest<'a> {
    pub fn cli() -> Self {
        Self {
            mode: RuntimeMode::Cli,
            cookie: None,
            remote_addr: None,
        }
    }

    pub fn http(cookie: Option<&'a str>, remote_addr: Option<IpAddr>) -> Self {
        Self {
            mode: RuntimeMode::Http,
            cookie,
            remote_addr,
        }
    }
}

/// Decides whether a request may run in debug mode.
#[derive(Debug, Clone, Default)]
pub struct DebugModeResolver {
    credentials: CredentialStore,
    allow_list: IpAllowList,
    default_debug: bool,
    cli_policy: CliDebugPolicy,
}

impl DebugModeResolver {
    pub fn new(credentials: CredentialStore, allow_list: IpAllowList) -> Self {
        Self {
            credentials,
            allow_list,
            default_debug: false,
            cli_policy: CliDebugPolicy::default(),
        }
    }

    /// Flag returned when no cookie mechanism applies.
    pub fn with_default_debug(mut self, default_debug: bool) -> Self {
        self.default_debug = default_debug;
        self
    }

    pub fn with_cli_policy(mut self, policy: CliDebugPolicy) -> Self {
        self.cli_policy = policy;
        self
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn allow_list(&self) -> &IpAllowList {
        &self.allow_list
    }

    pub fn default_debug(&self) -> bool {
        self.default_debug
    }

    /// Runs the decision procedure.
    ///
    /// # Errors
    ///
    /// Only `UnsupportedMode`, when the setting is `Auto`, the process is a
    /// CLI and the policy is [`CliDebugPolicy::Refuse`].
    pub fn resolve(&self, setting: DebugSetting, request: &DebugRequest<'_>) -> Result<bool> {
        match setting {
            DebugSetting::Enabled => return Ok(true),
            DebugSetting::Disabled => return Ok(false),
            DebugSetting::Auto => {}
        }

        if request.mode == RuntimeMode::Cli {
            return match self.cli_policy {
                CliDebugPolicy::StaticDefault => Ok(self.default_debug),
                CliDebugPolicy::Refuse => Err(BootstrapError::UnsupportedMode),
            };
        }

        if self.credentials.is_empty() {
            tracing::debug!("No developers registered, using default debug flag");
            return Ok(self.default_debug);
        }

        Ok(self.check_cookie(request))
    }

    fn check_cookie(&self, request: &DebugRequest<'_>) -> bool {
        let Some(cookie) = request.cookie else {
            tracing::debug!("No debug cookie");
            return false;
        };

        let Ok((slug, password)) = split_key(cookie) else {
            tracing::debug!("Malformed debug cookie");
            return false;
        };

        let Some(developer) = self.credentials.lookup(slug) else {
            tracing::debug!(slug, "Unknown developer in debug cookie");
            return false;
        };

        if !developer.ip_independent() && !self.allow_list.permits(request.remote_addr) {
            tracing::debug!(slug, remote_addr = ?request.remote_addr, "Address not allowed for debugging");
            return false;
        }

        match verify_password(password, developer.password_hash()) {
            Ok(verified) => {
                tracing::debug!(slug, verified, "Checked debug cookie");
                verified
            }
            Err(e) => {
                tracing::warn!(slug, error = %e, "Stored password hash could not be used");
                false
            }
        }
    }
}
