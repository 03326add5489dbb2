//! In-memory store backend.
//!
//! Every collection is a `HashMap` behind its own `Mutex`; each map key is
//! one identity's (or session's) independently owned entry, so holding the
//! collection lock across a read-modify-write gives the per-key atomicity
//! the traits require without any cross-identity coordination.

use crate::error::{AuthError, Result};
use crate::providers::{
    ChallengeOutcome, FailedAttemptRecord, FailedAttemptStore, RecoveryTokenRecord,
    RecoveryTokenStore, SessionStore, TwoFactorChallengeRecord, TwoFactorStore,
};
use crate::state::{Session, SessionId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn lock_poisoned() -> AuthError {
    AuthError::Store("mutex poisoned".to_string())
}

// ═══════════════════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════════════════

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (test helper).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.lock().map_err(|_| lock_poisoned())?.len())
    }

    /// Overwrite a raw record, bypassing the manager (test helper for
    /// tamper scenarios).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn overwrite_raw(&self, session: Session) -> Result<()> {
        self.sessions
            .lock()
            .map_err(|_| lock_poisoned())?
            .insert(session.session_id, session);
        Ok(())
    }
}

impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().map_err(|_| lock_poisoned())?;

        if sessions.contains_key(&session.session_id) {
            return Err(AuthError::Store("session ID already exists".to_string()));
        }

        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.lock().map_err(|_| lock_poisoned())?;
        Ok(sessions.get(&session_id).cloned())
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().map_err(|_| lock_poisoned())?;

        if !sessions.contains_key(&session.session_id) {
            return Err(AuthError::Store("session not found".to_string()));
        }

        sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        self.sessions
            .lock()
            .map_err(|_| lock_poisoned())?
            .remove(&session_id);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Failed Attempts
// ═══════════════════════════════════════════════════════════════════════

/// In-memory failed-attempt store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFailedAttemptStore {
    records: Arc<Mutex<HashMap<String, FailedAttemptRecord>>>,
}

impl MemoryFailedAttemptStore {
    /// Create an empty failed-attempt store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FailedAttemptStore for MemoryFailedAttemptStore {
    async fn get_record(&self, identity_key: &str) -> Result<Option<FailedAttemptRecord>> {
        let records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(records.get(identity_key).cloned())
    }

    async fn record_failure(
        &self,
        identity_key: &str,
        reset_before: DateTime<Utc>,
    ) -> Result<FailedAttemptRecord> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;
        let now = Utc::now();

        // Increment-or-reset under one lock hold: concurrent failures
        // serialize here, so no update is lost.
        let record = records
            .entry(identity_key.to_string())
            .and_modify(|r| {
                if r.last_attempt_at < reset_before {
                    r.count = 1;
                } else {
                    r.count += 1;
                }
                r.last_attempt_at = now;
            })
            .or_insert_with(|| FailedAttemptRecord {
                identity_key: identity_key.to_string(),
                count: 1,
                last_attempt_at: now,
            });

        Ok(record.clone())
    }

    async fn clear(&self, identity_key: &str) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| lock_poisoned())?
            .remove(identity_key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Two-Factor Challenges
// ═══════════════════════════════════════════════════════════════════════

/// In-memory two-factor challenge store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTwoFactorStore {
    challenges: Arc<Mutex<HashMap<String, TwoFactorChallengeRecord>>>,
}

impl MemoryTwoFactorStore {
    /// Create an empty challenge store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the pending challenge for a key (test helper).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn pending_challenge(&self, identity_key: &str) -> Result<Option<TwoFactorChallengeRecord>> {
        Ok(self
            .challenges
            .lock()
            .map_err(|_| lock_poisoned())?
            .get(identity_key)
            .cloned())
    }
}

impl TwoFactorStore for MemoryTwoFactorStore {
    async fn store_challenge(&self, challenge: TwoFactorChallengeRecord) -> Result<()> {
        let mut challenges = self.challenges.lock().map_err(|_| lock_poisoned())?;

        // Replace-on-reissue: no two pending challenges per key.
        challenges.insert(challenge.identity_key.clone(), challenge);
        Ok(())
    }

    async fn validate_code(&self, identity_key: &str, submitted: &str) -> Result<ChallengeOutcome> {
        let mut challenges = self.challenges.lock().map_err(|_| lock_poisoned())?;

        // Take the entry out and only reinsert a surviving challenge: the
        // whole check-decrement-destroy step happens under one lock hold.
        let Some(mut challenge) = challenges.remove(identity_key) else {
            return Ok(ChallengeOutcome::Missing);
        };

        if Utc::now() > challenge.expires_at {
            return Ok(ChallengeOutcome::Missing);
        }

        let matches =
            constant_time_eq::constant_time_eq(submitted.as_bytes(), challenge.code.as_bytes());

        if matches {
            return Ok(ChallengeOutcome::Accepted);
        }

        challenge.remaining_attempts = challenge.remaining_attempts.saturating_sub(1);
        if challenge.remaining_attempts == 0 {
            return Ok(ChallengeOutcome::Exhausted);
        }

        let remaining_attempts = challenge.remaining_attempts;
        challenges.insert(identity_key.to_string(), challenge);

        Ok(ChallengeOutcome::Mismatch { remaining_attempts })
    }

    async fn delete_challenge(&self, identity_key: &str) -> Result<()> {
        self.challenges
            .lock()
            .map_err(|_| lock_poisoned())?
            .remove(identity_key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Recovery Tokens
// ═══════════════════════════════════════════════════════════════════════

/// In-memory recovery token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecoveryTokenStore {
    tokens: Arc<Mutex<HashMap<String, RecoveryTokenRecord>>>,
}

impl MemoryRecoveryTokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tokens (test helper).
    ///
    /// # Errors
    ///
    /// Returns error if the lock is poisoned.
    pub fn token_count(&self) -> Result<usize> {
        Ok(self.tokens.lock().map_err(|_| lock_poisoned())?.len())
    }
}

impl RecoveryTokenStore for MemoryRecoveryTokenStore {
    async fn store_token(&self, record: RecoveryTokenRecord) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(|_| lock_poisoned())?;
        tokens.insert(record.token.clone(), record);
        Ok(())
    }

    async fn peek_token(&self, token: &str) -> Result<Option<RecoveryTokenRecord>> {
        let tokens = self.tokens.lock().map_err(|_| lock_poisoned())?;
        Ok(tokens.get(token).cloned())
    }

    async fn consume_token(&self, token: &str) -> Result<Option<RecoveryTokenRecord>> {
        let mut tokens = self.tokens.lock().map_err(|_| lock_poisoned())?;

        // Remove under one lock hold: exactly one concurrent caller can
        // win the record.
        Ok(tokens.remove(token))
    }
}
