//! Typed values from dotenv files.
//!
//! Raw key/value pairs come from `dotenvy`; this module only applies type
//! coercion:
//! - digit-only strings without a leading zero (or a single digit) become integers,
//! - `digits.digits` becomes a float,
//! - `true`/`false` in any case become booleans,
//! - everything else stays a string.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{BootstrapError, Result};

/// A coerced dotenv value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl EnvValue {
    pub fn coerce(raw: &str) -> Self {
        if all_digits(raw) && (raw.len() == 1 || !raw.starts_with('0')) {
            // Too large for i64: keep the text.
            if let Ok(n) = raw.parse() {
                return Self::Integer(n);
            }
        } else if let Some((int, frac)) = raw.split_once('.')
            && all_digits(int)
            && all_digits(frac)
            && let Ok(f) = raw.parse()
        {
            return Self::Float(f);
        } else if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        } else if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        Self::String(raw.to_string())
    }
}

/// Coerces an already-loaded mapping.
pub fn coerce_pairs<I, K, V>(pairs: I) -> BTreeMap<String, EnvValue>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), EnvValue::coerce(v.as_ref())))
        .collect()
}

/// Reads a dotenv file without touching the process environment.
///
/// # Errors
///
/// - `ConfigFileNotFound` if `path` does not exist.
/// - `DotenvParse` / `DotenvIo` for unreadable or invalid files; these never
///   include line contents.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, EnvValue>> {
    if !path.exists() {
        return Err(BootstrapError::ConfigFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut values = BTreeMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        values.insert(key, EnvValue::coerce(&value));
    }
    tracing::debug!(path = %path.display(), count = values.len(), "Loaded env file");
    Ok(values)
}
