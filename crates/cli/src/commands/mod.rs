//! CLI command implementations.

pub mod env_file;
pub mod new_developer;
pub mod resolve;
