//! Salted SHA-256 implementation of the `SecretHasher` port.
//!
//! Hashes are stored as `sha256$<salt hex>$<digest hex>`. The digest is the
//! salt and secret hashed, then re-hashed [`ROUNDS`] times to slow guessing.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::domain::ports::{SecretHasher, SecretHasherError};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
/// Re-hash iterations applied after the first digest.
pub const ROUNDS: u32 = 10_000;

/// Salted, iterated SHA-256 secret hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256SecretHasher;

fn digest(salt: &[u8], secret: &str) -> Zeroizing<[u8; 32]> {
    let mut current: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(secret.as_bytes())
        .finalize()
        .into();
    for _ in 0..ROUNDS {
        current = Sha256::new()
            .chain_update(current)
            .chain_update(salt)
            .finalize()
            .into();
    }
    Zeroizing::new(current)
}

impl SecretHasher for Sha256SecretHasher {
    fn hash(&self, secret: &str) -> String {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = digest(&salt, secret);
        format!("{SCHEME}${}${}", hex::encode(salt), hex::encode(digest.as_slice()))
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool, SecretHasherError> {
        let mut parts = hash.split('$');
        let (Some(scheme), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SecretHasherError::malformed_hash("expected three `$` fields"));
        };
        if scheme != SCHEME {
            return Err(SecretHasherError::malformed_hash(format!(
                "unsupported scheme `{scheme}`"
            )));
        }
        let salt = hex::decode(salt)
            .map_err(|err| SecretHasherError::malformed_hash(format!("salt: {err}")))?;
        let expected = hex::decode(expected)
            .map_err(|err| SecretHasherError::malformed_hash(format!("digest: {err}")))?;
        let computed = digest(&salt, secret);
        Ok(computed.as_slice().ct_eq(&expected).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashes_verify_only_their_own_secret() {
        let hasher = Sha256SecretHasher;
        let hash = hasher.hash("correct horse");
        assert_eq!(hasher.verify("correct horse", &hash), Ok(true));
        assert_eq!(hasher.verify("battery staple", &hash), Ok(false));
    }

    #[rstest]
    fn equal_secrets_get_distinct_salts() {
        let hasher = Sha256SecretHasher;
        let first = hasher.hash("pw");
        let second = hasher.hash("pw");
        assert_ne!(first, second);
        assert!(first.starts_with("sha256$"));
        assert_eq!(first.split('$').count(), 3);
    }

    #[rstest]
    #[case("plain$pw")]
    #[case("sha256$zz$00")]
    #[case("sha256$00")]
    #[case("md5$00$00")]
    #[case("sha256$00$00$00")]
    fn malformed_hashes_are_errors(#[case] stored: &str) {
        let err = Sha256SecretHasher
            .verify("pw", stored)
            .expect_err("malformed");
        assert!(matches!(err, SecretHasherError::MalformedHash { .. }));
    }

    #[rstest]
    #[case::first_byte(0)]
    #[case::last_byte(31)]
    fn a_single_flipped_digest_byte_is_rejected(#[case] index: usize) {
        let hash = Sha256SecretHasher.hash("pw");
        let (prefix, digest) = hash.rsplit_once('$').expect("three fields");
        let mut bytes = hex::decode(digest).expect("hex digest");
        bytes[index] ^= 0x01;
        let tampered = format!("{prefix}${}", hex::encode(bytes));
        assert_eq!(Sha256SecretHasher.verify("pw", &tampered), Ok(false));
        assert_eq!(Sha256SecretHasher.verify("pw", &hash), Ok(true));
    }

    #[rstest]
    fn truncated_digests_never_match() {
        let hash = Sha256SecretHasher.hash("pw");
        let truncated = hash.get(..hash.len() - 2).expect("ascii hash");
        assert_eq!(Sha256SecretHasher.verify("pw", truncated), Ok(false));
    }
}
