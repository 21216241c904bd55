//! Print the typed values of a dotenv file.

use std::path::Path;

use anyhow::{Context, Result};
use devgate_config::{EnvValue, load_env_file};

use crate::args::OutputFormat;

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let values = load_env_file(path)
        .with_context(|| format!("Failed to load env file {}", path.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&values)?),
        OutputFormat::Text => {
            for (key, value) in &values {
                let (kind, shown) = match value {
                    EnvValue::Integer(n) => ("int", n.to_string()),
                    EnvValue::Float(f) => ("float", f.to_string()),
                    EnvValue::Bool(b) => ("bool", b.to_string()),
                    EnvValue::String(s) => ("string", format!("{s:?}")),
                };
                println!("{key} = {shown} ({kind})");
            }
        }
    }
    Ok(())
}
