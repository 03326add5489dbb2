//! Recovery token store trait.
//!
//! Stores single-use password-reset tokens with atomic consumption.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A password-recovery token record.
///
/// The token string itself is the lookup key: an opaque value of at least
/// 32 random alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryTokenRecord {
    /// Opaque token value.
    pub token: String,

    /// Email address the token was issued for.
    pub email: String,

    /// Token expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// Token creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Recovery token store.
///
/// Pure storage: expiry judgment stays with the recovery service, which
/// needs to tell an expired token apart from one that never existed. A
/// backend with native TTL support should keep expired records around for
/// a grace period if it wants the distinction preserved.
///
/// # Security Requirements
///
/// 1. **Atomicity**: `consume_token` must atomically check and delete —
///    backends use `GETDEL`-style commands or `DELETE ... RETURNING`;
///    the in-memory backend holds one mutex across check-and-remove.
/// 2. **Single-use**: once consumed, a token can never be redeemed again,
///    even if the password reset that follows fails partway.
pub trait RecoveryTokenStore: Send + Sync {
    /// Store a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn store_token(
        &self,
        record: RecoveryTokenRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read a token without consuming it (pre-flight validation for UI).
    ///
    /// Returns `Ok(None)` for absent tokens; expired records are returned
    /// as stored.
    ///
    /// # Errors
    ///
    /// Returns error if the backend query fails.
    fn peek_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<RecoveryTokenRecord>>> + Send;

    /// Consume a token atomically.
    ///
    /// Exactly one of any number of concurrent calls for the same token
    /// receives `Some(record)`; the rest receive `None`. The record comes
    /// back as stored, expired or not — removal happens either way.
    ///
    /// # Errors
    ///
    /// Returns error if the backend operation fails.
    fn consume_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<RecoveryTokenRecord>>> + Send;
}
