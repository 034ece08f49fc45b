//! Port for hashing and verifying user secrets.
//!
//! The hashing algorithm is an adapter concern; the domain only stores the
//! opaque string returned by [`SecretHasher::hash`].

use super::define_port_error;

define_port_error! {
    /// Errors raised by secret hasher adapters.
    pub enum SecretHasherError {
        /// A stored hash could not be parsed.
        MalformedHash { message: String } =>
            "stored secret hash is malformed: {message}",
    }
}

/// Hash and verify user secrets.
#[cfg_attr(test, mockall::automock)]
pub trait SecretHasher: Send + Sync {
    /// Produce a storable hash for `secret`.
    fn hash(&self, secret: &str) -> String;

    /// Check `secret` against a hash produced by [`SecretHasher::hash`].
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, SecretHasherError>;
}

/// Reversible stand-in for tests: the "hash" is the secret with a prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSecretHasher;

const FIXTURE_PREFIX: &str = "plain$";

impl SecretHasher for FixtureSecretHasher {
    fn hash(&self, secret: &str) -> String {
        format!("{FIXTURE_PREFIX}{secret}")
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool, SecretHasherError> {
        hash.strip_prefix(FIXTURE_PREFIX)
            .map(|stored| stored == secret)
            .ok_or_else(|| SecretHasherError::malformed_hash("missing fixture prefix"))
    }
}
