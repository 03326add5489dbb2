//! Mock credential store for testing.

use crate::error::{AuthError, Result};
use crate::providers::{Credential, CredentialStore, PasswordHasher};
use crate::state::Identity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory credential directory.
///
/// Seedable stand-in for the external identity backend. Usernames and
/// emails are matched case-insensitively, like the real store contract
/// requires.
#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    records: Arc<Mutex<HashMap<String, (Identity, Credential)>>>,
}

impl MockCredentialStore {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an identity with a prebuilt credential.
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn seed(&self, identity: Identity, credential: Credential) -> Result<()> {
        let key = identity.username.trim().to_lowercase();
        self.records
            .lock()
            .map_err(|_| AuthError::Store("mutex poisoned".to_string()))?
            .insert(key, (identity, credential));
        Ok(())
    }

    /// Seed an identity with a password hashed through the given hasher.
    ///
    /// # Errors
    ///
    /// Returns error if hashing fails or the lock is poisoned.
    pub async fn create_account(
        &self,
        identity: Identity,
        password: &str,
        hasher: &impl PasswordHasher,
    ) -> Result<()> {
        let digest = hasher.hash_password(password).await?;
        let credential = Credential {
            identity_id: identity.id,
            password_hash: digest.hash,
            password_salt: digest.salt,
        };
        self.seed(identity, credential)
    }
}

impl CredentialStore for MockCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<(Identity, Credential)>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AuthError::Store("mutex poisoned".to_string()))?;
        Ok(records.get(&username.trim().to_lowercase()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AuthError::Store("mutex poisoned".to_string()))?;
        let needle = email.trim().to_lowercase();
        Ok(records
            .values()
            .find(|(identity, _)| identity.email.to_lowercase() == needle)
            .map(|(identity, _)| identity.clone()))
    }

    async fn update_credential(&self, credential: &Credential) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AuthError::Store("mutex poisoned".to_string()))?;

        let entry = records
            .values_mut()
            .find(|(identity, _)| identity.id == credential.identity_id)
            .ok_or_else(|| AuthError::Store("identity not found".to_string()))?;

        entry.1 = credential.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockPasswordHasher;
    use crate::state::{IdentityId, Role};

    fn identity() -> Identity {
        Identity {
            id: IdentityId::new(),
            username: "Alice".to_string(),
            display_name: "Alice".to_string(),
            email: "Alice@Example.com".to_string(),
            role: Role::Member,
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let store = MockCredentialStore::new();
        store
            .create_account(identity(), "sw0rdfish", &MockPasswordHasher::new())
            .await
            .unwrap();

        assert!(store.find_by_username("ALICE").await.unwrap().is_some());
        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_email("alice@example.com").await.unwrap().is_some());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_credential() {
        let store = MockCredentialStore::new();
        let hasher = MockPasswordHasher::new();
        let identity = identity();
        let identity_id = identity.id;
        store
            .create_account(identity, "sw0rdfish", &hasher)
            .await
            .unwrap();

        let digest = hasher.hash_password("NewPass1").await.unwrap();
        store
            .update_credential(&Credential {
                identity_id,
                password_hash: digest.hash.clone(),
                password_salt: digest.salt,
            })
            .await
            .unwrap();

        let (_, credential) = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(credential.password_hash, digest.hash);
    }

    #[tokio::test]
    async fn test_update_unknown_identity_fails() {
        let store = MockCredentialStore::new();
        let result = store
            .update_credential(&Credential {
                identity_id: IdentityId::new(),
                password_hash: "h".to_string(),
                password_salt: "s".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
