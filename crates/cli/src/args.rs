//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not build the bootstrap context (see `commands::resolve`).

use clap::{Parser, Subcommand, ValueEnum};
use devgate_config::DebugSetting;
use std::net::IpAddr;
use std::path::PathBuf;
use url::Url;

#[derive(Parser)]
#[command(name = "devgate")]
#[command(about = "devgate - developer debug access and environment resolution", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  devgate new-developer alice\n  devgate --settings devgate.json resolve --url https://example.com/app --cookie 'alice@secret' --ip 10.0.0.1\n  devgate --settings devgate.json resolve -- migrate --env=production\n  devgate env-file .env --output json\n"
)]
pub struct Cli {
    /// Path to the bootstrap settings file
    #[arg(long, global = true, env = "DEVGATE_SETTINGS_PATH")]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a public key and a secret key for a new developer
    NewDeveloper {
        /// Developer slug (0-9, A-Z, a-z, '.' and '/')
        slug: String,
    },

    /// Dry-run the bootstrap: debug mode, environment and configuration files
    Resolve {
        /// Request URL; when given, the invocation is treated as HTTP
        #[arg(long)]
        url: Option<Url>,

        /// Value of the debug cookie (slug@password)
        #[arg(long)]
        cookie: Option<String>,

        /// Remote address of the request
        #[arg(long)]
        ip: Option<IpAddr>,

        /// Explicit debug setting (true, false, auto)
        #[arg(long)]
        debug: Option<DebugSetting>,

        /// Explicit environment name
        #[arg(long = "env")]
        environment: Option<String>,

        /// Arguments of the simulated CLI process (scanned for --env)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the typed values of a dotenv file
    EnvFile {
        /// Path to the dotenv file
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_collects_trailing_args() {
        let cli = Cli::try_parse_from([
            "devgate", "resolve", "--debug", "auto", "--", "migrate", "--env=prod",
        ])
        .unwrap();
        match cli.command {
            Commands::Resolve { args, debug, .. } => {
                assert_eq!(args, vec!["migrate", "--env=prod"]);
                assert_eq!(debug, Some(DebugSetting::Auto));
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_invalid_debug_value_is_rejected() {
        assert!(Cli::try_parse_from(["devgate", "resolve", "--debug", "maybe"]).is_err());
    }
}
