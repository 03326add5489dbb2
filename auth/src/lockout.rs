//! Brute-force lockout guard.
//!
//! Tracks failed-attempt counters per identity key and enforces temporary
//! lockout. The check runs *before* credential verification so a locked
//! key fails fast without spending hash work, and so lockout versus
//! bad-credential failures are reported consistently.
//!
//! # Policy
//!
//! After `max_failed_attempts` failures within `window` of each other, the
//! key is locked for `window` measured from the most recent failure. A
//! failure outside the window resets the counter to 1 instead of
//! incrementing. Success clears the record.

use crate::config::LockoutConfig;
use crate::error::{AuthError, Result};
use crate::events::AuthEvent;
use crate::providers::{AuditSink, FailedAttemptRecord, FailedAttemptStore};
use chrono::Utc;
use tracing::{debug, warn};

/// Lockout guard over a failed-attempt store.
#[derive(Debug, Clone)]
pub struct LockoutGuard<F, A> {
    attempts: F,
    audit: A,
    config: LockoutConfig,
}

impl<F, A> LockoutGuard<F, A>
where
    F: FailedAttemptStore + Clone,
    A: AuditSink + Clone,
{
    /// Create a guard over the given attempt store.
    #[must_use]
    pub const fn new(attempts: F, audit: A, config: LockoutConfig) -> Self {
        Self {
            attempts,
            audit,
            config,
        }
    }

    /// Check whether a key may attempt authentication right now.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Locked`] with the remaining wait time if the key is
    ///   locked
    /// - [`AuthError::Store`] if the attempt store fails
    pub async fn check(&self, identity_key: &str) -> Result<()> {
        let Some(record) = self.attempts.get_record(identity_key).await? else {
            return Ok(());
        };

        if record.count < self.config.max_failed_attempts {
            return Ok(());
        }

        let now = Utc::now();
        let unlock_at = record.last_attempt_at + self.config.window;
        if now >= unlock_at {
            // Lock has logically expired; the stale record resets on the
            // next failure.
            return Ok(());
        }

        let retry_after = (unlock_at - now).to_std().unwrap_or_default();
        debug!(
            identity_key = %identity_key,
            retry_after_secs = retry_after.as_secs(),
            "login attempt while locked"
        );
        Err(AuthError::Locked { retry_after })
    }

    /// Whether a key is currently locked.
    ///
    /// # Errors
    ///
    /// Returns error if the attempt store fails.
    pub async fn is_locked(&self, identity_key: &str) -> Result<bool> {
        match self.check(identity_key).await {
            Ok(()) => Ok(false),
            Err(AuthError::Locked { .. }) => Ok(true),
            Err(e) => Err(e),
        }
    }

    /// Record a failed attempt and return the updated record.
    ///
    /// Crossing the threshold emits a `LockoutTriggered` audit event.
    ///
    /// # Errors
    ///
    /// Returns error if the attempt store fails.
    pub async fn record_failure(&self, identity_key: &str) -> Result<FailedAttemptRecord> {
        let reset_before = Utc::now() - self.config.window;
        let record = self
            .attempts
            .record_failure(identity_key, reset_before)
            .await?;

        if record.count == self.config.max_failed_attempts {
            let retry_after_secs =
                u64::try_from(self.config.window.num_seconds()).unwrap_or_default();
            warn!(
                identity_key = %identity_key,
                failures = record.count,
                retry_after_secs,
                "lockout triggered"
            );
            self.audit
                .record(AuthEvent::LockoutTriggered {
                    identity_key: identity_key.to_string(),
                    retry_after_secs,
                    timestamp: Utc::now(),
                })
                .await;
        }

        Ok(record)
    }

    /// Clear the failure record for a key (successful authentication).
    ///
    /// # Errors
    ///
    /// Returns error if the attempt store fails.
    pub async fn record_success(&self, identity_key: &str) -> Result<()> {
        self.attempts.clear(identity_key).await
    }
}
