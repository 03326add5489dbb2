//! Error types for authentication and session-lifecycle operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Comprehensive error taxonomy for the authentication core.
///
/// This enum covers all possible failure modes in the auth system,
/// organized by category for clear error handling and user feedback.
///
/// # Anti-enumeration
///
/// `InvalidCredentials` is deliberately returned for both "unknown user"
/// and "known user, wrong password". Callers must never be able to tell
/// the two apart, through error shape or timing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Input & Credential Errors
    // ═══════════════════════════════════════════════════════════

    /// Malformed username or password shape, rejected before any store access.
    #[error("Invalid input")]
    InvalidInput,

    /// Invalid credentials provided (or unknown user — indistinguishable).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Identity is temporarily locked after too many failed attempts.
    #[error("Account locked, retry after {retry_after:?}")]
    Locked {
        /// Duration to wait before another attempt is accepted.
        retry_after: std::time::Duration,
    },

    // ═══════════════════════════════════════════════════════════
    // Two-Factor Errors
    // ═══════════════════════════════════════════════════════════

    /// Two-factor challenge has expired, was already used, or never existed.
    ///
    /// The login flow must restart from credential verification.
    #[error("Two-factor challenge expired")]
    ChallengeExpired,

    /// Two-factor challenge destroyed after too many wrong codes.
    ///
    /// The login flow must restart from credential verification.
    #[error("Two-factor challenge exhausted")]
    ChallengeExhausted,

    /// Submitted two-factor code did not match; attempts remain.
    #[error("Two-factor code mismatch ({remaining_attempts} attempts left)")]
    ChallengeMismatch {
        /// Validation attempts left before the challenge is destroyed.
        remaining_attempts: u8,
    },

    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// Session has expired.
    #[error("Session has expired")]
    SessionExpired,

    /// Session integrity tag mismatch — persisted session data was tampered
    /// with. Always escalates to forced logout, never silently repaired.
    #[error("Session integrity check failed")]
    SessionIntegrity,

    // ═══════════════════════════════════════════════════════════
    // Recovery Errors
    // ═══════════════════════════════════════════════════════════

    /// Recovery token exists but is past its expiry.
    #[error("Recovery token has expired")]
    TokenExpired,

    /// Recovery token not found (never issued or already redeemed).
    #[error("Recovery token not found")]
    TokenNotFound,

    /// New password does not meet the strength policy.
    #[error("Password too weak: {reason}")]
    WeakPassword {
        /// Which rule the password failed.
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Delivery channel (code / recovery link) failed.
    #[error("Delivery failed")]
    DeliveryFailed,

    /// Backing store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Returns `true` if this error is due to user input and safe to branch
    /// on for UI messaging.
    ///
    /// # Examples
    ///
    /// ```
    /// # use warden_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::Internal.is_user_error());
    /// ```
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput
                | Self::InvalidCredentials
                | Self::Locked { .. }
                | Self::ChallengeExpired
                | Self::ChallengeExhausted
                | Self::ChallengeMismatch { .. }
                | Self::TokenExpired
                | Self::TokenNotFound
                | Self::WeakPassword { .. }
        )
    }

    /// Returns `true` if this error indicates a security event worth alerting on.
    ///
    /// # Examples
    ///
    /// ```
    /// # use warden_auth::AuthError;
    /// assert!(AuthError::SessionIntegrity.is_security_issue());
    /// assert!(!AuthError::SessionExpired.is_security_issue());
    /// ```
    pub const fn is_security_issue(&self) -> bool {
        matches!(
            self,
            Self::SessionIntegrity | Self::Locked { .. } | Self::ChallengeExhausted
        )
    }

    /// Returns `true` if this error is fatal to the current session.
    ///
    /// Fatal errors force a logout of the execution context's session.
    pub const fn is_session_fatal(&self) -> bool {
        matches!(self, Self::SessionIntegrity | Self::Store(_) | Self::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_classification() {
        assert!(AuthError::InvalidInput.is_user_error());
        assert!(
            AuthError::Locked {
                retry_after: std::time::Duration::from_secs(60)
            }
            .is_user_error()
        );
        assert!(!AuthError::Store("down".to_string()).is_user_error());
        assert!(!AuthError::SessionIntegrity.is_user_error());
    }

    #[test]
    fn test_session_fatal_classification() {
        assert!(AuthError::SessionIntegrity.is_session_fatal());
        assert!(AuthError::Store("down".to_string()).is_session_fatal());
        assert!(!AuthError::InvalidCredentials.is_session_fatal());
        assert!(!AuthError::SessionExpired.is_session_fatal());
    }
}
