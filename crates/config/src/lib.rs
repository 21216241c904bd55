//! Application bootstrap for devgate.
//!
//! This crate decides whether a process or request may run in debug mode,
//! which deployment environment it belongs to, and which configuration
//! fragments that environment loads.

pub mod accumulator;
pub mod constants;
pub mod context;
pub mod credentials;
pub mod debug_mode;
pub mod dotenv;
pub mod environment;
pub mod error;
pub mod ip;
pub mod keys;
mod loader;

pub use accumulator::{ConfigAccumulator, ParameterTable, ResolvedConfig};
pub use context::{Bootstrap, BootstrapOutcome};
pub use credentials::{CredentialStore, DeveloperRecord};
pub use debug_mode::{CliDebugPolicy, DebugModeResolver, DebugRequest, DebugSetting, RuntimeMode};
pub use dotenv::{EnvValue, coerce_pairs, load_env_file};
pub use environment::{EnvironmentResolver, EnvironmentRule, Invocation, MatchScope, RequestTarget};
pub use error::BootstrapError;
pub use ip::{IpAllowList, IpPattern};
pub use keys::{IssuedKeys, new_developer};
pub use loader::{
    BootstrapLoader, BootstrapSettings, DeveloperEntry, EnvironmentSettings, RuleEntry,
    env_var_or_none, read_settings_file,
};
