//! Session issuance, validation, renewal, and expiry.
//!
//! Sessions come in two shapes, fixed at issuance:
//!
//! - **idle-timeout** (default): short-lived with a sliding expiry that
//!   resets on activity
//! - **remember-me**: long-lived with a fixed absolute expiry, never slid
//!
//! Every session carries an integrity tag: an HMAC-SHA256 over the session
//! payload, keyed with a process-held secret. Validation recomputes the
//! tag; a mismatch means the persisted record was tampered with and always
//! escalates to forced logout.

use crate::config::SessionConfig;
use crate::error::{AuthError, Result};
use crate::events::AuthEvent;
use crate::providers::{AuditSink, SessionStore};
use crate::state::{Identity, Session, SessionId};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

// ═══════════════════════════════════════════════════════════════════════
// Integrity Key
// ═══════════════════════════════════════════════════════════════════════

/// Key for the session integrity tag.
///
/// Held process-side only; never derivable from client-visible data.
/// Sessions tagged under one key do not validate under another, so a
/// deployment that wants sessions to survive restarts must supply a
/// stable key via [`IntegrityKey::from_bytes`].
#[derive(Clone, Copy)]
pub struct IntegrityKey([u8; 32]);

impl IntegrityKey {
    /// Generate a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build a key from existing bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for IntegrityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("IntegrityKey(..)")
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Timer Handle
// ═══════════════════════════════════════════════════════════════════════

/// Handle to a scheduled background task (idle-expiry watch, renewal
/// sweep).
///
/// The task is aborted when the handle is cancelled or dropped, so every
/// exit path that discards the handle also stops the timer — no leaked
/// free-running callbacks.
#[derive(Debug)]
pub struct TimerHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) const fn new(handle: tokio::task::JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stop the underlying task.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has already finished or been aborted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session Manager
// ═══════════════════════════════════════════════════════════════════════

/// Session manager.
///
/// Owns the idle-timeout clock: issuance picks the expiry shape, renewal
/// extends sliding sessions nearing expiry, validation enforces both the
/// expiry and the integrity tag.
#[derive(Debug, Clone)]
pub struct SessionManager<S, A> {
    store: S,
    audit: A,
    key: IntegrityKey,
    config: SessionConfig,
}

impl<S, A> SessionManager<S, A>
where
    S: SessionStore + Clone,
    A: AuditSink + Clone,
{
    /// Create a manager over the given store with a process-held key.
    #[must_use]
    pub const fn new(store: S, audit: A, key: IntegrityKey, config: SessionConfig) -> Self {
        Self {
            store,
            audit,
            key,
            config,
        }
    }

    /// The configured policy.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issue a session for a verified identity.
    ///
    /// `remember_me` selects the fixed extended expiry; otherwise the
    /// session gets the sliding idle timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn issue(&self, identity: Identity, remember_me: bool) -> Result<Session> {
        let now = Utc::now();
        let expires_at = if remember_me {
            now + self.config.remember_me_duration
        } else {
            now + self.config.idle_timeout
        };

        let mut session = Session {
            session_id: SessionId::new(),
            identity,
            issued_at: now,
            expires_at,
            renewable: !remember_me,
            integrity_tag: String::new(),
        };
        session.integrity_tag = self.compute_tag(&session);

        self.store.create_session(&session).await?;

        info!(
            session_id = %session.session_id,
            identity_id = %session.identity.id,
            remember_me,
            expires_at = %session.expires_at,
            "session issued"
        );
        self.audit
            .record(AuthEvent::SessionIssued {
                session_id: session.session_id,
                identity_id: session.identity.id,
                remember_me,
                expires_at: session.expires_at,
                timestamp: now,
            })
            .await;

        Ok(session)
    }

    /// Load a session record from the durability layer.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn load(&self, session_id: SessionId) -> Result<Option<Session>> {
        self.store.get_session(session_id).await
    }

    /// Validate a session: integrity tag first, then expiry.
    ///
    /// A tag mismatch destroys the stored record, emits a tamper audit
    /// event, and returns [`AuthError::SessionIntegrity`] — the caller
    /// must treat it as a forced logout.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionIntegrity`] on tag mismatch
    /// - [`AuthError::SessionExpired`] past expiry
    /// - [`AuthError::Store`] if the store fails
    pub async fn validate(&self, session: &Session) -> Result<()> {
        if !self.verify_tag(session) {
            warn!(session_id = %session.session_id, "session integrity tag mismatch");
            self.store.delete_session(session.session_id).await?;
            self.audit
                .record(AuthEvent::TamperDetected {
                    session_id: session.session_id,
                    timestamp: Utc::now(),
                })
                .await;
            return Err(AuthError::SessionIntegrity);
        }

        if session.is_expired(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }

        Ok(())
    }

    /// Extend a sliding session's expiry if it is close enough to matter.
    ///
    /// Returns `Ok(true)` when the expiry was extended. Remember-me
    /// sessions and sessions with more than the renewal threshold left are
    /// untouched; an already-expired session is a no-op (`Ok(false)`),
    /// never resurrected.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn renew_if_needed(&self, session: &mut Session) -> Result<bool> {
        if !session.renewable {
            return Ok(false);
        }

        let now = Utc::now();
        if session.is_expired(now) {
            return Ok(false);
        }

        if session.remaining(now) > self.config.renewal_threshold {
            return Ok(false);
        }

        session.expires_at = now + self.config.idle_timeout;
        session.integrity_tag = self.compute_tag(session);
        self.store.update_session(session).await?;

        debug!(
            session_id = %session.session_id,
            expires_at = %session.expires_at,
            "session renewed"
        );
        self.audit
            .record(AuthEvent::SessionRenewed {
                session_id: session.session_id,
                expires_at: session.expires_at,
                timestamp: now,
            })
            .await;

        Ok(true)
    }

    /// Destroy a session that passed its expiry.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn expire(&self, session: &Session) -> Result<()> {
        self.store.delete_session(session.session_id).await?;

        info!(session_id = %session.session_id, "session expired");
        self.audit
            .record(AuthEvent::SessionExpired {
                session_id: session.session_id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// Destroy a session on explicit logout.
    ///
    /// # Errors
    ///
    /// Returns error if the session store fails.
    pub async fn logout(&self, session: &Session, reason: Option<&str>) -> Result<()> {
        self.store.delete_session(session.session_id).await?;

        info!(
            session_id = %session.session_id,
            reason = reason.unwrap_or("unspecified"),
            "session logged out"
        );
        self.audit
            .record(AuthEvent::LoggedOut {
                session_id: session.session_id,
                reason: reason.map(str::to_string),
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// Recompute the tag and compare it constant-time against the stored one.
    #[must_use]
    pub fn verify_tag(&self, session: &Session) -> bool {
        let expected = self.compute_tag(session);
        constant_time_eq::constant_time_eq(
            expected.as_bytes(),
            session.integrity_tag.as_bytes(),
        )
    }

    /// Keyed MAC over the canonical session payload.
    ///
    /// Covers the identity snapshot and both timestamps, so edits to any
    /// persisted field invalidate the tag. Renewal recomputes it for the
    /// extended expiry.
    fn compute_tag(&self, session: &Session) -> String {
        let payload = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}",
            session.session_id,
            session.identity.id,
            session.identity.username,
            session.identity.display_name,
            session.identity.email,
            session.identity.role.as_str(),
            session.identity.enabled,
            session.issued_at.timestamp_micros(),
            session.expires_at.timestamp_micros(),
            session.renewable,
        );

        // new_from_slice accepts any key length for HMAC; ours is fixed-width.
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key.0) else {
            return String::new();
        };
        mac.update(payload.as_bytes());
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
