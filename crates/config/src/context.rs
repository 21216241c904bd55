//! The bootstrap context.
//!
//! Responsibilities:
//! - Own the developer registry, allow-list, environment rules and fragment
//!   lists once they have been built.
//! - Run the bootstrap sequence: debug mode, then environment, then
//!   configuration fragments.
//!
//! Does NOT handle:
//! - Building itself (see loader/builder.rs).
//! - Parsing fragment contents.
//!
//! Invariants:
//! - A `Bootstrap` is never mutated after construction; it is `Send + Sync`
//!   and can be shared across request-handling threads.
//! - Tests get a fresh context by building a new one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::accumulator::{ConfigAccumulator, ResolvedConfig};
use crate::debug_mode::{DebugModeResolver, DebugRequest, DebugSetting};
use crate::environment::{EnvironmentResolver, Invocation};
use crate::error::Result;

/// Result of a full bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootstrapOutcome {
    pub debug_mode: bool,
    pub environment: String,
    pub config: ResolvedConfig,
}

/// Read-only bootstrap context, built by [`crate::BootstrapLoader`].
#[derive(Debug, Clone)]
pub struct Bootstrap {
    debug: DebugModeResolver,
    environment: EnvironmentResolver,
    debug_setting: DebugSetting,
    explicit_environment: Option<String>,
    config_dir: PathBuf,
    config_extension: String,
    fragments: BTreeMap<String, Vec<String>>,
}

impl Bootstrap {
    pub(crate) fn new(
        debug: DebugModeResolver,
        environment: EnvironmentResolver,
        debug_setting: DebugSetting,
        explicit_environment: Option<String>,
        config_dir: PathBuf,
        config_extension: String,
        fragments: BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            debug,
            environment,
            debug_setting,
            explicit_environment,
            config_dir,
            config_extension,
            fragments,
        }
    }

    pub fn debug_resolver(&self) -> &DebugModeResolver {
        &self.debug
    }

    pub fn environment_resolver(&self) -> &EnvironmentResolver {
        &self.environment
    }

    pub fn debug_setting(&self) -> DebugSetting {
        self.debug_setting
    }

    pub fn explicit_environment(&self) -> Option<&str> {
        self.explicit_environment.as_deref()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Whether `request` runs in debug mode under the configured setting.
    pub fn debug_mode(&self, request: &DebugRequest<'_>) -> Result<bool> {
        self.debug.resolve(self.debug_setting, request)
    }

    /// The environment for `invocation`.
    pub fn environment(&self, invocation: &Invocation<'_>) -> Result<String> {
        self.environment
            .resolve(self.explicit_environment.as_deref(), invocation)
    }

    /// Fragment ids configured for `environment`, in load order.
    pub fn fragments_for(&self, environment: &str) -> &[String] {
        self.fragments
            .get(environment)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// A fresh accumulator rooted at the configured fragment directory.
    pub fn config_accumulator(&self) -> ConfigAccumulator {
        ConfigAccumulator::new(&self.config_dir).with_extension(&self.config_extension)
    }

    /// Accumulates every fragment configured for `environment`.
    pub fn load_config(&self, environment: &str) -> Result<ResolvedConfig> {
        let mut accumulator = self.config_accumulator();
        for fragment in self.fragments_for(environment) {
            accumulator.add_fragment(fragment)?;
        }
        Ok(accumulator.finish())
    }

    /// Runs the whole bootstrap sequence for one process or request.
    pub fn resolve(
        &self,
        request: &DebugRequest<'_>,
        invocation: &Invocation<'_>,
    ) -> Result<BootstrapOutcome> {
        let debug_mode = self.debug_mode(request)?;
        let environment = self.environment(invocation)?;
        let config = self.load_config(&environment)?;

        tracing::info!(
            debug_mode,
            environment = %environment,
            files = config.files.len(),
            "Bootstrap resolved"
        );

        Ok(BootstrapOutcome {
            debug_mode,
            environment,
            config,
        })
    }
}
