//! Developer key encoding, issuance and password verification.
//!
//! Responsibilities:
//! - Split `slug@secret` and `slug@hash` keys on the first separator.
//! - Issue new developer credentials (password, public key, secret key).
//! - Hash and verify passwords with Argon2id in PHC string format.
//!
//! Does NOT handle:
//! - Storing developer records (see credentials.rs).
//! - Reading the debug cookie (see debug_mode.rs).
//!
//! Invariants:
//! - Splitting stops at the first `@`; passwords may contain `@`.
//! - Every hash carries its own random salt.
//! - Passwords and secret keys are only handed out as `SecretString`.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};

use crate::constants::{
    DEFAULT_PASSWORD_LENGTH, KEY_SEPARATOR, PASSWORD_ALPHABET_END, PASSWORD_ALPHABET_START,
};
use crate::error::{BootstrapError, Result};

/// Splits a key into `(slug, rest)` at the first `@`.
///
/// `rest` is either a password (secret key) or a password hash (public key).
pub fn split_key(key: &str) -> Result<(&str, &str)> {
    key.split_once(KEY_SEPARATOR)
        .ok_or(BootstrapError::MalformedKey)
}

/// Builds the public key `slug@hash(password)`.
pub fn make_public_key(slug: &str, password: &SecretString) -> Result<String> {
    let hash = hash_password(password.expose_secret())?;
    Ok(format!("{slug}{KEY_SEPARATOR}{hash}"))
}

/// Builds the secret key `slug@password`.
pub fn make_secret_key(slug: &str, password: &SecretString) -> SecretString {
    SecretString::new(format!("{slug}{KEY_SEPARATOR}{}", password.expose_secret()).into())
}

/// The default password alphabet: printable ASCII from `!` to `~`.
pub fn default_alphabet() -> Vec<char> {
    (PASSWORD_ALPHABET_START..=PASSWORD_ALPHABET_END)
        .map(char::from)
        .collect()
}

/// Generates a random password of `length` characters drawn from `alphabet`.
///
/// Bytes from the thread-local CSPRNG are mapped onto the alphabet with
/// rejection sampling so every character is equally likely.
pub fn generate_password(length: usize, alphabet: &[char]) -> Result<SecretString> {
    if alphabet.is_empty() || alphabet.len() > 256 || !alphabet.iter().all(char::is_ascii) {
        return Err(BootstrapError::InvalidAlphabet {
            len: alphabet.len(),
        });
    }

    let size = alphabet.len();
    // Largest multiple of `size` that fits in a byte; bytes above it are rejected.
    let limit = 256 - (256 % size);
    let mut password = String::with_capacity(length);
    let mut buf = [0u8; 64];
    let mut rng = rand::rng();

    while password.len() < length {
        rng.fill(&mut buf);
        for byte in buf {
            let byte = usize::from(byte);
            if byte >= limit {
                continue;
            }
            password.push(alphabet[byte % size]);
            if password.len() == length {
                break;
            }
        }
    }

    Ok(SecretString::new(password.into()))
}

/// Hashes a password using Argon2id with a fresh random salt.
///
/// Returns the hash in PHC format: `$argon2id$v=19$m=...,t=...,p=...$salt$hash`
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| BootstrapError::PasswordHash(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| BootstrapError::PasswordHash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Returns true when `hash` parses as a PHC password hash string.
pub fn is_valid_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

/// Verifies a password against a stored hash.
///
/// The comparison of the derived output is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| BootstrapError::PasswordHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(BootstrapError::PasswordHash(e.to_string())),
    }
}

/// Returns true for slugs made only of `0-9A-Za-z./`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '/')
}

/// Credentials issued for a new developer.
///
/// The public key goes into the application's settings; the secret key is
/// handed privately to the developer, who stores it in the debug cookie.
#[derive(Debug)]
pub struct IssuedKeys {
    /// `slug@hash`, safe to commit.
    pub public_key: String,
    /// `slug@password`.
    pub secret_key: SecretString,
    /// The secret key, form-urlencoded for pasting into a cookie or URL.
    pub secret_key_urlencoded: SecretString,
}

/// Issues credentials for a new developer identified by `slug`.
pub fn new_developer(slug: &str) -> Result<IssuedKeys> {
    if !is_valid_slug(slug) {
        return Err(BootstrapError::InvalidSlug(slug.to_string()));
    }

    let password = generate_password(DEFAULT_PASSWORD_LENGTH, &default_alphabet())?;
    let public_key = make_public_key(slug, &password)?;
    let secret_key = make_secret_key(slug, &password);
    let encoded: String =
        url::form_urlencoded::byte_serialize(secret_key.expose_secret().as_bytes()).collect();

    Ok(IssuedKeys {
        public_key,
        secret_key,
        secret_key_urlencoded: SecretString::new(encoded.into()),
    })
}
