//! Issue keys for a new developer.
//!
//! The public key goes into the settings file; the secret key is given to the
//! developer, who stores it in the `devgate-debug` cookie.

use anyhow::{Context, Result};
use devgate_config::constants::DEBUG_COOKIE_NAME;
use devgate_config::new_developer;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::args::OutputFormat;

#[derive(Serialize)]
struct KeysOutput<'a> {
    public_key: &'a str,
    secret_key: &'a str,
    secret_key_urlencoded: &'a str,
    cookie_name: &'a str,
}

pub fn run(slug: &str, format: OutputFormat) -> Result<()> {
    let keys = new_developer(slug).context("Failed to issue developer keys")?;
    tracing::info!(slug, "Issued developer keys");

    let output = KeysOutput {
        public_key: &keys.public_key,
        secret_key: keys.secret_key.expose_secret(),
        secret_key_urlencoded: keys.secret_key_urlencoded.expose_secret(),
        cookie_name: DEBUG_COOKIE_NAME,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => {
            println!("Public key:");
            println!("{}", output.public_key);
            println!();
            println!("Secret key (cookie '{}'):", output.cookie_name);
            println!("{}", output.secret_key);
            println!();
            println!("Secret key (URL encoded):");
            println!("{}", output.secret_key_urlencoded);
        }
    }
    Ok(())
}
