//! Credential verification with timing equalization.

use crate::config::CredentialConfig;
use crate::error::Result;
use crate::providers::{CredentialStore, PasswordDigest, PasswordHasher};
use crate::state::Identity;
use tracing::debug;

/// Credential validator.
///
/// Looks up a credential by identity key and verifies a plaintext secret
/// against it through the pluggable hasher.
///
/// # Anti-enumeration
///
/// `verify` returns `Ok(None)` for unknown users, disabled identities,
/// and wrong passwords alike — the caller cannot tell which. Every call,
/// successful or not, is padded to a minimum wall-clock duration so the
/// outcome cannot be read from response timing either.
#[derive(Debug, Clone)]
pub struct CredentialValidator<C, H> {
    credentials: C,
    hasher: H,
    config: CredentialConfig,
}

impl<C, H> CredentialValidator<C, H>
where
    C: CredentialStore + Clone,
    H: PasswordHasher + Clone,
{
    /// Create a validator over the given store and hasher.
    #[must_use]
    pub const fn new(credentials: C, hasher: H, config: CredentialConfig) -> Self {
        Self {
            credentials,
            hasher,
            config,
        }
    }

    /// Verify a plaintext secret for an identity key (case-insensitive).
    ///
    /// Returns the identity snapshot on success, `Ok(None)` on any
    /// credential mismatch. The configured floor delay applies to every
    /// path out of this function, including store errors.
    ///
    /// # Errors
    ///
    /// Returns error if the credential store or hasher fails.
    pub async fn verify(&self, identity_key: &str, plaintext: &str) -> Result<Option<Identity>> {
        let started = tokio::time::Instant::now();
        let outcome = self.verify_inner(identity_key, plaintext).await;

        // Pad to the floor regardless of outcome so "unknown user",
        // "wrong password", success, and store failure are not
        // distinguishable by timing.
        let elapsed = started.elapsed();
        if elapsed < self.config.verify_floor {
            tokio::time::sleep(self.config.verify_floor - elapsed).await;
        }

        outcome
    }

    async fn verify_inner(&self, identity_key: &str, plaintext: &str) -> Result<Option<Identity>> {
        let Some((identity, credential)) = self.credentials.find_by_username(identity_key).await?
        else {
            debug!(identity_key = %identity_key, "credential lookup missed");
            return Ok(None);
        };

        if !identity.enabled {
            debug!(identity_key = %identity_key, "identity disabled");
            return Ok(None);
        }

        // Hash and salt travel as one unit into the hasher.
        let digest = PasswordDigest {
            hash: credential.password_hash,
            salt: credential.password_salt,
        };

        if self.hasher.verify_password(plaintext, &digest).await? {
            Ok(Some(identity))
        } else {
            debug!(identity_key = %identity_key, "password mismatch");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockCredentialStore, MockPasswordHasher};
    use crate::state::{IdentityId, Role};

    fn test_config() -> CredentialConfig {
        CredentialConfig::new().with_verify_floor(std::time::Duration::from_millis(20))
    }

    fn identity(username: &str, enabled: bool) -> Identity {
        Identity {
            id: IdentityId::new(),
            username: username.to_string(),
            display_name: username.to_string(),
            email: format!("{username}@example.com"),
            role: Role::Member,
            enabled,
        }
    }

    async fn seeded_validator(
        enabled: bool,
    ) -> CredentialValidator<MockCredentialStore, MockPasswordHasher> {
        let store = MockCredentialStore::new();
        let hasher = MockPasswordHasher::new();
        store
            .create_account(identity("Alice", enabled), "sw0rdfish", &hasher)
            .await
            .unwrap();
        CredentialValidator::new(store, hasher, test_config())
    }

    #[tokio::test]
    async fn test_verify_success_is_case_insensitive() {
        let validator = seeded_validator(true).await;

        let verified = validator.verify("alice", "sw0rdfish").await.unwrap();
        assert_eq!(verified.map(|i| i.username), Some("Alice".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_identical() {
        let validator = seeded_validator(true).await;

        let wrong = validator.verify("alice", "wrong").await.unwrap();
        let unknown = validator.verify("nobody", "sw0rdfish").await.unwrap();
        assert_eq!(wrong, unknown);
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_disabled_identity_rejected() {
        let validator = seeded_validator(false).await;

        let verified = validator.verify("alice", "sw0rdfish").await.unwrap();
        assert!(verified.is_none());
    }

    #[tokio::test]
    async fn test_floor_applies_to_every_outcome() {
        let validator = seeded_validator(true).await;
        let floor = std::time::Duration::from_millis(20);

        for (user, pass) in [("alice", "sw0rdfish"), ("alice", "wrong"), ("ghost", "x")] {
            let started = std::time::Instant::now();
            let _ = validator.verify(user, pass).await.unwrap();
            assert!(
                started.elapsed() >= floor,
                "verify({user}) returned before the floor"
            );
        }
    }
}
