//! Credential store trait.
//!
//! The credential store holds identities and their password credentials.
//! It is consumed, not owned, by this core: record management (creating
//! accounts, changing roles, disabling identities) happens elsewhere. The
//! only write this core performs is the credential replacement at the end
//! of a password reset.

use crate::error::Result;
use crate::state::{Identity, IdentityId};
use serde::{Deserialize, Serialize};

/// Password credential for one identity.
///
/// Invariant: exactly one active credential per identity; the hash/salt
/// pair is always verified together, never the hash alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Identity this credential belongs to.
    pub identity_id: IdentityId,

    /// One-way password hash (format owned by the hasher collaborator).
    pub password_hash: String,

    /// Salt the hash was derived with.
    pub password_salt: String,
}

/// Credential store.
///
/// This trait abstracts over the identity/credential backend.
///
/// # Implementation Notes
///
/// - Username lookup is case-insensitive; implementations should index a
///   normalized (lowercased) key.
/// - Absent identities return `Ok(None)`, never a distinct error — the
///   caller is responsible for keeping "unknown user" indistinguishable
///   from "wrong password".
pub trait CredentialStore: Send + Sync {
    /// Look up an identity and its credential by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns error if the backend query fails.
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<(Identity, Credential)>>> + Send;

    /// Look up an identity by email address (case-insensitive).
    ///
    /// Used by the recovery flow; absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend query fails.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Identity>>> + Send;

    /// Replace the credential for an identity.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend write fails
    /// - The identity does not exist
    fn update_credential(
        &self,
        credential: &Credential,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
