//! Authentication audit events.
//!
//! The core emits structured events to an external audit sink; it does not
//! own their storage or retention policy. Every security-relevant state
//! change produces exactly one event.

use crate::state::{IdentityId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication audit events.
///
/// These events represent facts that have happened in the authentication
/// core. They are handed to the [`crate::providers::AuditSink`]
/// collaborator in the order they occur within one execution context.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum AuthEvent {
    // ═══════════════════════════════════════════════════════════════════════
    // Login Events
    // ═══════════════════════════════════════════════════════════════════════
    /// Primary credential verification succeeded.
    LoginSucceeded {
        /// Identity that authenticated.
        identity_id: IdentityId,
        /// Normalized identity key (lowercased username).
        identity_key: String,
        /// When the login completed.
        timestamp: DateTime<Utc>,
    },

    /// A login attempt failed.
    ///
    /// Emitted for unknown users and wrong passwords alike; the event does
    /// not record which, matching the caller-visible behavior.
    LoginFailed {
        /// Normalized identity key the attempt was made against.
        identity_key: String,
        /// Failure count within the current window after this attempt.
        failure_count: u32,
        /// When the attempt was rejected.
        timestamp: DateTime<Utc>,
    },

    /// Failure threshold crossed; the identity key is now locked.
    LockoutTriggered {
        /// Normalized identity key that locked.
        identity_key: String,
        /// Seconds until the lock expires.
        retry_after_secs: u64,
        /// When the lockout started.
        timestamp: DateTime<Utc>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Session Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A session was issued.
    SessionIssued {
        /// New session identifier.
        session_id: SessionId,
        /// Authenticated identity.
        identity_id: IdentityId,
        /// Whether the session uses the extended fixed expiry.
        remember_me: bool,
        /// Absolute expiry at issuance.
        expires_at: DateTime<Utc>,
        /// When the session was issued.
        timestamp: DateTime<Utc>,
    },

    /// A session's expiry was extended by renewal.
    SessionRenewed {
        /// Renewed session.
        session_id: SessionId,
        /// New absolute expiry.
        expires_at: DateTime<Utc>,
        /// When the renewal happened.
        timestamp: DateTime<Utc>,
    },

    /// A session passed its expiry and was destroyed.
    SessionExpired {
        /// Expired session.
        session_id: SessionId,
        /// When the expiry was enforced.
        timestamp: DateTime<Utc>,
    },

    /// A session was ended by explicit logout.
    LoggedOut {
        /// Ended session.
        session_id: SessionId,
        /// Caller-supplied reason, if any.
        reason: Option<String>,
        /// When the logout happened.
        timestamp: DateTime<Utc>,
    },

    /// Persisted session data failed the integrity check.
    ///
    /// Always followed by a forced logout of the tampered session.
    TamperDetected {
        /// Session whose tag failed recomputation.
        session_id: SessionId,
        /// When the tamper was detected.
        timestamp: DateTime<Utc>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Two-Factor Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A two-factor challenge was issued and handed to the delivery channel.
    TwoFactorIssued {
        /// Identity key the challenge belongs to.
        identity_key: String,
        /// Challenge expiry.
        expires_at: DateTime<Utc>,
        /// When the challenge was issued.
        timestamp: DateTime<Utc>,
    },

    /// A submitted code matched; the challenge was consumed.
    TwoFactorVerified {
        /// Identity key that completed the challenge.
        identity_key: String,
        /// When the code was accepted.
        timestamp: DateTime<Utc>,
    },

    /// A submitted code did not match.
    TwoFactorFailed {
        /// Identity key the attempt was made against.
        identity_key: String,
        /// Attempts left before the challenge is destroyed.
        remaining_attempts: u8,
        /// When the code was rejected.
        timestamp: DateTime<Utc>,
    },

    /// The challenge was destroyed after its last wrong attempt.
    TwoFactorExhausted {
        /// Identity key whose challenge was destroyed.
        identity_key: String,
        /// When the challenge was destroyed.
        timestamp: DateTime<Utc>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Recovery Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A recovery request was received.
    ///
    /// Emitted for every request, known email or not; `token_issued`
    /// records whether a token actually went out.
    RecoveryRequested {
        /// Email address the request named.
        email: String,
        /// Whether the email resolved to an identity and a token was issued.
        token_issued: bool,
        /// When the request was handled.
        timestamp: DateTime<Utc>,
    },

    /// A recovery token was redeemed (deleted) ahead of a password reset.
    RecoveryTokenRedeemed {
        /// Email the token was bound to.
        email: String,
        /// When the token was consumed.
        timestamp: DateTime<Utc>,
    },

    /// A password reset completed through the credential store.
    PasswordReset {
        /// Identity whose credential was replaced.
        identity_id: IdentityId,
        /// When the reset completed.
        timestamp: DateTime<Utc>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // System Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A backing-store operation failed mid-flow.
    StoreFailure {
        /// Which operation failed.
        context: String,
        /// When the failure surfaced.
        timestamp: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Short machine-readable event kind, for log fields and sink routing.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "login_succeeded",
            Self::LoginFailed { .. } => "login_failed",
            Self::LockoutTriggered { .. } => "lockout_triggered",
            Self::SessionIssued { .. } => "session_issued",
            Self::SessionRenewed { .. } => "session_renewed",
            Self::SessionExpired { .. } => "session_expired",
            Self::LoggedOut { .. } => "logged_out",
            Self::TamperDetected { .. } => "tamper_detected",
            Self::TwoFactorIssued { .. } => "two_factor_issued",
            Self::TwoFactorVerified { .. } => "two_factor_verified",
            Self::TwoFactorFailed { .. } => "two_factor_failed",
            Self::TwoFactorExhausted { .. } => "two_factor_exhausted",
            Self::RecoveryRequested { .. } => "recovery_requested",
            Self::RecoveryTokenRedeemed { .. } => "recovery_token_redeemed",
            Self::PasswordReset { .. } => "password_reset",
            Self::StoreFailure { .. } => "store_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kinds() {
        let event = AuthEvent::LoginFailed {
            identity_key: "alice".to_string(),
            failure_count: 1,
            timestamp: Utc::now(),
        };
        assert_eq!(event.kind(), "login_failed");

        let event = AuthEvent::TamperDetected {
            session_id: SessionId::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.kind(), "tamper_detected");
    }

    #[test]
    fn test_event_serialization_round_trip() {
        let event = AuthEvent::SessionIssued {
            session_id: SessionId::new(),
            identity_id: IdentityId::new(),
            remember_me: false,
            expires_at: Utc::now() + chrono::Duration::minutes(30),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: AuthEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
