//! Mock password hasher for testing.

use crate::error::Result;
use crate::providers::{PasswordDigest, PasswordHasher};
use sha2::{Digest, Sha256};

/// Fast deterministic hasher for tests.
///
/// A single salted SHA-256 round — **not** a KDF, never for production.
/// It keeps the hash/salt pair contract of the real hasher while making
/// seeding and verification effectively free.
#[derive(Debug, Clone, Default)]
pub struct MockPasswordHasher;

impl MockPasswordHasher {
    /// Create a new mock hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn digest_hex(plaintext: &str, salt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"\x00");
        hasher.update(plaintext.as_bytes());
        let bytes = hasher.finalize();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl PasswordHasher for MockPasswordHasher {
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordDigest> {
        use rand::Rng;

        let salt: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        Ok(PasswordDigest {
            hash: Self::digest_hex(plaintext, &salt),
            salt,
        })
    }

    async fn verify_password(&self, plaintext: &str, digest: &PasswordDigest) -> Result<bool> {
        let recomputed = Self::digest_hex(plaintext, &digest.salt);
        Ok(constant_time_eq::constant_time_eq(
            recomputed.as_bytes(),
            digest.hash.as_bytes(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let hasher = MockPasswordHasher::new();
        let digest = hasher.hash_password("secret1A").await.unwrap();

        assert!(hasher.verify_password("secret1A", &digest).await.unwrap());
        assert!(!hasher.verify_password("wrong", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let hasher = MockPasswordHasher::new();
        let a = hasher.hash_password("secret1A").await.unwrap();
        let b = hasher.hash_password("secret1A").await.unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }
}
