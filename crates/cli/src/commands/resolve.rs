//! Dry-run of the bootstrap sequence.
//!
//! Responsibilities:
//! - Build a `Bootstrap` from the settings file, environment and flags.
//! - Simulate one HTTP request (`--url`) or one CLI process (trailing args).
//! - Print the resolved debug mode, environment and configuration.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use devgate_config::{
    BootstrapLoader, BootstrapOutcome, DebugRequest, DebugSetting, Invocation, RequestTarget,
};
use url::Url;

use crate::args::OutputFormat;

pub struct ResolveArgs {
    pub settings: Option<PathBuf>,
    pub url: Option<Url>,
    pub cookie: Option<String>,
    pub ip: Option<IpAddr>,
    pub debug: Option<DebugSetting>,
    pub environment: Option<String>,
    pub args: Vec<String>,
}

pub fn run(args: ResolveArgs, format: OutputFormat) -> Result<()> {
    let mut loader = BootstrapLoader::new();
    if let Some(path) = args.settings {
        loader = loader.with_settings_path(path);
    }
    loader = loader
        .from_env()
        .context("Failed to read bootstrap settings from environment")?
        .from_settings_file()
        .context("Failed to load bootstrap settings")?;
    if let Some(debug) = args.debug {
        loader = loader.with_debug(debug);
    }
    if let Some(environment) = args.environment {
        loader = loader.with_environment(environment);
    }
    let bootstrap = loader.build().context("Failed to build bootstrap")?;

    let target = args.url.as_ref().map(RequestTarget::from_url);
    let (request, invocation) = match &target {
        Some(target) => (
            DebugRequest::http(args.cookie.as_deref(), args.ip),
            Invocation::Http { target },
        ),
        None => (DebugRequest::cli(), Invocation::Cli { args: &args.args }),
    };

    let outcome = bootstrap.resolve(&request, &invocation)?;
    print_outcome(&outcome, format)
}

fn print_outcome(outcome: &BootstrapOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => {
            println!("debug_mode: {}", outcome.debug_mode);
            println!("environment: {}", outcome.environment);
            println!("files:");
            for file in &outcome.config.files {
                println!("  {}", file.display());
            }
            println!("parameters:");
            for (namespace, value) in outcome.config.parameters.iter() {
                println!("  {namespace} = {value}");
            }
        }
    }
    Ok(())
}
