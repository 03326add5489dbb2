//! Two-factor challenge storage trait.
//!
//! Stores short-lived one-time codes with expiration, an attempt budget,
//! and atomic consumption.
//!
//! # Security
//!
//! Two-factor challenges must be:
//! - **Single-use**: destroyed on first successful validation
//! - **Ephemeral**: expire after 5 minutes (configurable)
//! - **Bounded**: destroyed after the attempt budget is spent
//! - **Exclusive**: at most one pending challenge per identity key;
//!   issuing a new one replaces the old

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pending two-factor challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoFactorChallengeRecord {
    /// Normalized identity key the challenge belongs to.
    pub identity_key: String,

    /// The one-time code (6 decimal digits).
    pub code: String,

    /// Challenge expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// Validation attempts left; starts at the configured budget and
    /// decrements on mismatch.
    pub remaining_attempts: u8,
}

/// Outcome of one validation attempt against the store.
///
/// The store owns the whole check because match, decrement, and removal
/// must happen under one atomic operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Code matched; the challenge has been destroyed.
    Accepted,

    /// Code did not match; attempts remain.
    Mismatch {
        /// Attempts left after this one.
        remaining_attempts: u8,
    },

    /// Code did not match and the budget is spent; the challenge has been
    /// destroyed.
    Exhausted,

    /// No live challenge: never issued, already consumed, or past expiry
    /// (an expired challenge is removed on the way out). The three cases
    /// are deliberately indistinguishable.
    Missing,
}

/// Two-factor challenge store.
///
/// # Atomicity
///
/// `validate_code` performs lookup, constant-time comparison, attempt
/// decrement, and removal as one atomic step. Concurrent validations of
/// the same challenge must never both be `Accepted`, and two concurrent
/// mismatches must spend two attempts.
pub trait TwoFactorStore: Send + Sync {
    /// Store a challenge, replacing any pending one for the same key.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn store_challenge(
        &self,
        challenge: TwoFactorChallengeRecord,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Validate a submitted code atomically.
    ///
    /// # Errors
    ///
    /// Returns error only on backend failures; every policy result is a
    /// [`ChallengeOutcome`].
    fn validate_code(
        &self,
        identity_key: &str,
        submitted: &str,
    ) -> impl std::future::Future<Output = Result<ChallengeOutcome>> + Send;

    /// Remove a pending challenge (flow abandoned or superseded).
    /// Removing an absent challenge is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn delete_challenge(
        &self,
        identity_key: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
