//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Exit code mapping (see `error` module).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;

/// Dispatch CLI commands to their respective handlers.
pub(crate) fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::NewDeveloper { slug } => commands::new_developer::run(&slug, cli.output),
        Commands::Resolve {
            url,
            cookie,
            ip,
            debug,
            environment,
            args,
        } => commands::resolve::run(
            commands::resolve::ResolveArgs {
                settings: cli.settings,
                url,
                cookie,
                ip,
                debug,
                environment,
                args,
            },
            cli.output,
        ),
        Commands::EnvFile { path } => commands::env_file::run(&path, cli.output),
    }
}
