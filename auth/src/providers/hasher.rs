//! Password hasher trait and the bundled Argon2id implementation.
//!
//! The KDF choice is a pluggable collaborator: components only see the
//! trait. The bundled implementation uses Argon2id with OWASP-shaped
//! parameters.

use crate::error::{AuthError, Result};
use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, Params, PasswordHasher as _};
use serde::{Deserialize, Serialize};

/// A hash/salt pair produced by a [`PasswordHasher`].
///
/// The two halves are stored together and verified together, never the
/// hash alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordDigest {
    /// Encoded one-way hash.
    pub hash: String,

    /// Salt the hash was derived with.
    pub salt: String,
}

/// One-way hash and verify for secrets.
///
/// # Security
///
/// `verify` must compare in constant time. Implementations are async
/// because key derivation is deliberately expensive.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext secret with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns error if key derivation fails.
    fn hash_password(
        &self,
        plaintext: &str,
    ) -> impl std::future::Future<Output = Result<PasswordDigest>> + Send;

    /// Verify a plaintext secret against a stored digest.
    ///
    /// Returns `Ok(false)` on mismatch; errors are reserved for malformed
    /// digests and derivation failures.
    ///
    /// # Errors
    ///
    /// Returns error if the stored digest cannot be parsed.
    fn verify_password(
        &self,
        plaintext: &str,
        digest: &PasswordDigest,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Bundled Argon2id hasher.
///
/// Parameters follow OWASP recommendations (memory-hard, GPU-resistant).
/// Tests use [`crate::mocks::MockPasswordHasher`] instead; these settings
/// make every call take tens of milliseconds by design.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB.
    memory_cost: u32,
    /// Iteration count.
    time_cost: u32,
    /// Lane count.
    parallelism: u32,
}

impl Argon2Hasher {
    /// Create a hasher with default parameters (64 MiB, 3 iterations, 4 lanes).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create a hasher with custom parameters.
    #[must_use]
    pub const fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::Internal)?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordDigest> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.argon2()?;

        let hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| AuthError::Internal)?;

        Ok(PasswordDigest {
            hash: hash.to_string(),
            salt: salt.as_str().to_string(),
        })
    }

    async fn verify_password(&self, plaintext: &str, digest: &PasswordDigest) -> Result<bool> {
        let parsed = PasswordHash::new(&digest.hash).map_err(|_| AuthError::Internal)?;

        // The pair is one unit: a hash whose embedded salt disagrees with
        // the stored salt column is treated as a mismatch, not verified.
        let salt_matches = parsed
            .salt
            .as_ref()
            .is_some_and(|s| s.as_str() == digest.salt.as_str());
        if !salt_matches {
            return Ok(false);
        }

        use argon2::PasswordVerifier as _;
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::Internal),
        }
    }
}
