//! Registry of developers allowed to unlock debug mode.
//!
//! Responsibilities:
//! - Decode public keys and register one record per developer slug.
//! - Look up a developer by slug.
//!
//! Does NOT handle:
//! - Password verification (see keys.rs).
//! - IP checks (see ip.rs).
//!
//! Invariants:
//! - A slug is registered at most once; re-registering is an error.
//! - Records are never mutated after registration.

use std::collections::HashMap;

use crate::error::{BootstrapError, Result};
use crate::keys::{is_valid_hash, split_key};

/// A registered developer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperRecord {
    slug: String,
    password_hash: String,
    ip_independent: bool,
}

impl DeveloperRecord {
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// PHC-formatted hash of the developer's password.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Whether this developer may debug from any IP address.
    pub fn ip_independent(&self) -> bool {
        self.ip_independent
    }
}

/// In-memory developer registry, populated during bootstrap.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    developers: HashMap<String, DeveloperRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a developer from a public key obtained via [`crate::keys::new_developer`].
    ///
    /// # Errors
    ///
    /// - `MalformedKey` if the key has no `@` or an empty slug.
    /// - `InvalidPasswordHash` if the hash part is not a PHC hash string.
    /// - `DuplicateDeveloper` if the slug is already registered.
    pub fn add_developer(&mut self, public_key: &str, ip_independent: bool) -> Result<()> {
        let (slug, hash) = split_key(public_key)?;
        if slug.is_empty() {
            return Err(BootstrapError::MalformedKey);
        }
        if !is_valid_hash(hash) {
            return Err(BootstrapError::InvalidPasswordHash {
                slug: slug.to_string(),
            });
        }
        if self.developers.contains_key(slug) {
            return Err(BootstrapError::DuplicateDeveloper {
                slug: slug.to_string(),
            });
        }

        tracing::debug!(slug, ip_independent, "Registered developer");
        self.developers.insert(
            slug.to_string(),
            DeveloperRecord {
                slug: slug.to_string(),
                password_hash: hash.to_string(),
                ip_independent,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, slug: &str) -> Option<&DeveloperRecord> {
        self.developers.get(slug)
    }

    pub fn is_empty(&self) -> bool {
        self.developers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.developers.len()
    }

    /// Registered slugs, sorted.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.developers.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::hash_password;

    fn public_key(slug: &str, password: &str) -> String {
        format!("{slug}@{}", hash_password(password).unwrap())
    }

    #[test]
    fn test_add_and_lookup() {
        let mut store = CredentialStore::new();
        assert!(store.is_empty());

        store
            .add_developer(&public_key("alice", "pw"), true)
            .unwrap();

        let record = store.lookup("alice").unwrap();
        assert_eq!(record.slug(), "alice");
        assert!(record.ip_independent());
        assert!(record.password_hash().starts_with("$argon2id$"));
        assert_eq!(store.len(), 1);
        assert!(store.lookup("bob").is_none());
    }

    #[test]
    fn test_duplicate_slug_is_rejected() {
        let mut store = CredentialStore::new();
        store
            .add_developer(&public_key("alice", "one"), false)
            .unwrap();

        let err = store
            .add_developer(&public_key("alice", "two"), false)
            .unwrap_err();
        assert!(matches!(err, BootstrapError::DuplicateDeveloper { slug } if slug == "alice"));
    }

    #[test]
    fn test_malformed_public_keys() {
        let mut store = CredentialStore::new();
        assert!(matches!(
            store.add_developer("no-separator", false),
            Err(BootstrapError::MalformedKey)
        ));
        assert!(matches!(
            store.add_developer(&format!("@{}", hash_password("pw").unwrap()), false),
            Err(BootstrapError::MalformedKey)
        ));
        assert!(matches!(
            store.add_developer("alice@plaintext", false),
            Err(BootstrapError::InvalidPasswordHash { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_slugs_are_sorted() {
        let mut store = CredentialStore::new();
        store.add_developer(&public_key("zed", "a"), false).unwrap();
        store.add_developer(&public_key("amy", "b"), false).unwrap();
        assert_eq!(store.slugs(), vec!["amy", "zed"]);
    }
}
