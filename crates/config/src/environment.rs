//! Environment name resolution.
//!
//! Responsibilities:
//! - Pick the environment from an explicit value, the `--env` CLI flag, or
//!   an ordered list of URL rules.
//! - Normalise request targets (strip port, query and fragment).
//!
//! Does NOT handle:
//! - Loading the configuration of the chosen environment (see accumulator.rs).
//!
//! Invariants:
//! - Rules are evaluated in list order; the first match wins.
//! - Literal rules only match at path-segment boundaries.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::constants::ENV_FLAG;
use crate::error::{BootstrapError, Result};

/// What a regex rule is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// Host followed by path, e.g. `example.com/app`.
    ///
    /// Trailing slashes are trimmed, so the root of a site is seen as
    /// `example.com`, never `example.com/`.
    #[default]
    Url,
    /// Host only.
    Host,
}

/// One rule mapping requests to an environment.
///
/// Request hosts are lowercased, so literal prefixes have their host part
/// lowercased and regex rules are compiled case-insensitively.
#[derive(Debug, Clone)]
pub enum EnvironmentRule {
    /// Matches when the request URL starts with `prefix` at a segment boundary.
    Literal { prefix: String, target: String },
    Regex { pattern: Regex, target: String },
}

impl EnvironmentRule {
    pub fn literal(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        let prefix = prefix.trim().trim_end_matches('/');
        let prefix = match prefix.split_once('/') {
            Some((host, path)) => format!("{}/{path}", host.to_ascii_lowercase()),
            None => prefix.to_ascii_lowercase(),
        };
        Self::Literal {
            prefix,
            target: target.into(),
        }
    }

    pub fn regex(pattern: &str, target: impl Into<String>) -> Result<Self> {
        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| BootstrapError::InvalidRegex {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::Regex {
            pattern,
            target: target.into(),
        })
    }

    /// Builds a rule from its textual form: patterns starting with `^` are
    /// regular expressions, everything else is a literal prefix.
    pub fn parse(pattern: &str, target: impl Into<String>) -> Result<Self> {
        if pattern.starts_with('^') {
            Self::regex(pattern, target)
        } else {
            Ok(Self::literal(pattern, target))
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Self::Literal { target, .. } | Self::Regex { target, .. } => target,
        }
    }

    pub fn matches(&self, request: &RequestTarget, scope: MatchScope) -> bool {
        match self {
            Self::Literal { prefix, .. } => {
                let url = format!("{}/", request.url());
                url.starts_with(&format!("{prefix}/"))
            }
            Self::Regex { pattern, .. } => match scope {
                MatchScope::Url => pattern.is_match(request.url()),
                MatchScope::Host => pattern.is_match(request.host()),
            },
        }
    }
}

/// Normalised host and path of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    host: String,
    url: String,
}

impl RequestTarget {
    /// Builds a target from a `Host` header and a request URI path.
    ///
    /// The port is dropped from the host, the query string and fragment from
    /// the path, and trailing slashes from the combined URL.
    pub fn new(host: &str, path: &str) -> Self {
        let host = strip_port(host.trim()).to_ascii_lowercase();
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = if path.is_empty() || path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let url = format!("{host}{path}").trim_end_matches('/').to_string();
        Self { host, url }
    }

    pub fn from_url(url: &url::Url) -> Self {
        Self::new(url.host_str().unwrap_or_default(), url.path())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host followed by path, e.g. `example.com/app/sub`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // Bracketed IPv6 literal, keep up to the closing bracket.
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.split_once(':') {
        Some((name, port)) if !port.contains(':') => name,
        _ => host,
    }
}

/// How the process was invoked, as far as environment resolution cares.
#[derive(Debug, Clone, Copy)]
pub enum Invocation<'a> {
    Cli { args: &'a [String] },
    Http { target: &'a RequestTarget },
}

/// Finds the value of `--env` in either `--env value` or `--env=value` form.
///
/// The last occurrence carrying a value wins. An empty or missing value
/// never erases an earlier one.
pub fn find_env_flag(args: &[String]) -> Option<&str> {
    let flag = format!("--{ENV_FLAG}");
    let prefix = format!("{flag}=");
    let mut found = None;

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if arg == &flag {
            // A bare `--env` only takes the next token when it is not another flag.
            if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
                found = Some(value.as_str()).filter(|v| !v.is_empty()).or(found);
            }
        } else if let Some(value) = arg.strip_prefix(&prefix)
            && !value.is_empty()
        {
            found = Some(value);
        }
    }

    found
}

/// Determines the active environment name.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentResolver {
    rules: Vec<EnvironmentRule>,
    scope: MatchScope,
    default_environment: Option<String>,
    require_cli_flag: bool,
}

impl EnvironmentResolver {
    pub fn new(rules: Vec<EnvironmentRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: MatchScope) -> Self {
        self.scope = scope;
        self
    }

    /// Environment used when neither the CLI flag nor any rule applies.
    pub fn with_default_environment(mut self, name: Option<String>) -> Self {
        self.default_environment = name;
        self
    }

    /// Makes `--env` mandatory for CLI invocations, ignoring the default.
    pub fn with_required_cli_flag(mut self, required: bool) -> Self {
        self.require_cli_flag = required;
        self
    }

    pub fn rules(&self) -> &[EnvironmentRule] {
        &self.rules
    }

    pub fn resolve(&self, explicit: Option<&str>, invocation: &Invocation<'_>) -> Result<String> {
        if let Some(name) = explicit {
            tracing::info!(environment = name, "Using explicit environment");
            return Ok(name.to_string());
        }

        match invocation {
            Invocation::Cli { args } => self.resolve_cli(args),
            Invocation::Http { target } => self.resolve_http(target),
        }
    }

    fn resolve_cli(&self, args: &[String]) -> Result<String> {
        if let Some(name) = find_env_flag(args) {
            tracing::info!(environment = name, "Using environment from --{ENV_FLAG}");
            return Ok(name.to_string());
        }
        if self.require_cli_flag {
            return Err(BootstrapError::MissingEnvironment);
        }
        self.default_environment
            .clone()
            .ok_or(BootstrapError::MissingEnvironment)
    }

    fn resolve_http(&self, target: &RequestTarget) -> Result<String> {
        if let Some(rule) = self.rules.iter().find(|r| r.matches(target, self.scope)) {
            tracing::info!(
                environment = rule.target(),
                url = target.url(),
                "Matched environment rule"
            );
            return Ok(rule.target().to_string());
        }

        match &self.default_environment {
            Some(name) => {
                tracing::info!(environment = %name, url = target.url(), "No rule matched, using default environment");
                Ok(name.clone())
            }
            None => Err(BootstrapError::NoEnvironmentMatch {
                url: target.url().to_string(),
            }),
        }
    }
}
