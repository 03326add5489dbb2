//! Failed-attempt store trait for brute-force lockout.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Failure counter for one identity key.
///
/// Created lazily on first failure, never explicitly deleted — it expires
/// logically once the window passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAttemptRecord {
    /// Normalized identity key (lowercased username).
    pub identity_key: String,

    /// Failures counted within the current window.
    pub count: u32,

    /// Timestamp of the most recent failure.
    pub last_attempt_at: DateTime<Utc>,
}

/// Failed-attempt store.
///
/// # Security
///
/// Failures are recorded for **every** identity key, whether or not the
/// identity exists — otherwise the counter itself would leak which
/// usernames are registered.
///
/// # Atomicity
///
/// `record_failure` is a read-modify-write on a single key and MUST be
/// atomic (mutex-protected map, `INCR`-style backend command, or a
/// transactional upsert). Two concurrent failures must produce two
/// increments, never a lost update.
pub trait FailedAttemptStore: Send + Sync {
    /// Read the failure record for a key, if one exists.
    ///
    /// # Errors
    ///
    /// Returns error if the backend query fails.
    fn get_record(
        &self,
        identity_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<FailedAttemptRecord>>> + Send;

    /// Record a failure atomically and return the updated record.
    ///
    /// If the existing record's `last_attempt_at` is before `reset_before`
    /// (the failure fell outside the rolling window), the count restarts
    /// at 1 instead of incrementing.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn record_failure(
        &self,
        identity_key: &str,
        reset_before: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<FailedAttemptRecord>> + Send;

    /// Clear the record for a key (successful authentication).
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn clear(
        &self,
        identity_key: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
