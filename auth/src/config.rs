//! Authentication configuration.
//!
//! This module provides configuration structures for each component of the
//! auth core. Values default to the production policy; tests shrink the
//! windows to run in milliseconds.

use chrono::Duration;

/// Brute-force lockout configuration.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Failures within the window before the identity locks.
    ///
    /// Default: 5
    pub max_failed_attempts: u32,

    /// Rolling window for counting failures, and the lock duration
    /// measured from the most recent failure.
    ///
    /// Default: 15 minutes
    pub window: Duration,
}

impl LockoutConfig {
    /// Create a lockout configuration with default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_failed_attempts: 5,
            window: Duration::minutes(15),
        }
    }

    /// Set the failure threshold.
    #[must_use]
    pub const fn with_max_failed_attempts(mut self, attempts: u32) -> Self {
        self.max_failed_attempts = attempts;
        self
    }

    /// Set the rolling window / lock duration.
    #[must_use]
    pub const fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Session lifetime configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sliding idle timeout for ordinary sessions.
    ///
    /// Default: 30 minutes
    pub idle_timeout: Duration,

    /// Fixed absolute lifetime for remember-me sessions (no sliding renewal).
    ///
    /// Default: 7 days
    pub remember_me_duration: Duration,

    /// Renewal only happens when remaining time drops below this threshold,
    /// to avoid needless store writes.
    ///
    /// Default: 5 minutes
    pub renewal_threshold: Duration,

    /// Interval of the process-level sweep that renews a session nearing
    /// expiry.
    ///
    /// Default: 1 minute
    pub sweep_interval: Duration,
}

impl SessionConfig {
    /// Create a session configuration with default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            idle_timeout: Duration::minutes(30),
            remember_me_duration: Duration::days(7),
            renewal_threshold: Duration::minutes(5),
            sweep_interval: Duration::minutes(1),
        }
    }

    /// Set the sliding idle timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the remember-me absolute lifetime.
    #[must_use]
    pub const fn with_remember_me_duration(mut self, duration: Duration) -> Self {
        self.remember_me_duration = duration;
        self
    }

    /// Set the renewal threshold.
    #[must_use]
    pub const fn with_renewal_threshold(mut self, threshold: Duration) -> Self {
        self.renewal_threshold = threshold;
        self
    }

    /// Set the renewal sweep interval.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-factor challenge configuration.
#[derive(Debug, Clone)]
pub struct TwoFactorConfig {
    /// Code time-to-live.
    ///
    /// Default: 5 minutes
    pub code_ttl: Duration,

    /// Wrong codes accepted before the challenge is destroyed.
    ///
    /// Default: 3
    pub max_attempts: u8,

    /// Deadline for the whole 2FA-gated login flow, independent of the
    /// code's own TTL.
    ///
    /// Default: 10 minutes
    pub pending_ttl: Duration,
}

impl TwoFactorConfig {
    /// Create a two-factor configuration with default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            code_ttl: Duration::minutes(5),
            max_attempts: 3,
            pending_ttl: Duration::minutes(10),
        }
    }

    /// Set the code time-to-live.
    #[must_use]
    pub const fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    /// Set the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the pending-flow deadline.
    #[must_use]
    pub const fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = ttl;
        self
    }
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Password-recovery configuration.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Recovery token time-to-live.
    ///
    /// Default: 30 minutes
    pub token_ttl: Duration,

    /// Length of generated tokens in alphanumeric characters.
    ///
    /// Default: 32 (the minimum accepted)
    pub token_length: usize,

    /// Minimum accepted password length.
    ///
    /// Default: 8
    pub min_password_length: usize,
}

impl RecoveryConfig {
    /// Create a recovery configuration with default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token_ttl: Duration::minutes(30),
            token_length: 32,
            min_password_length: 8,
        }
    }

    /// Set the token time-to-live.
    #[must_use]
    pub const fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the generated token length (values below 32 are clamped to 32).
    #[must_use]
    pub const fn with_token_length(mut self, length: usize) -> Self {
        self.token_length = if length < 32 { 32 } else { length };
        self
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Credential verification configuration.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    /// Minimum wall-clock duration of every verification attempt,
    /// successful or not. Equalizes timing between "unknown user",
    /// "wrong password", and success.
    ///
    /// Default: 1 second
    pub verify_floor: std::time::Duration,

    /// Maximum accepted length for username and password input.
    ///
    /// Default: 256
    pub max_input_length: usize,
}

impl CredentialConfig {
    /// Create a credential configuration with default policy.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verify_floor: std::time::Duration::from_secs(1),
            max_input_length: 256,
        }
    }

    /// Set the timing-equalization floor.
    #[must_use]
    pub const fn with_verify_floor(mut self, floor: std::time::Duration) -> Self {
        self.verify_floor = floor;
        self
    }

    /// Set the maximum input length.
    #[must_use]
    pub const fn with_max_input_length(mut self, length: usize) -> Self {
        self.max_input_length = length;
        self
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Root configuration bundling every component policy.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Lockout policy.
    pub lockout: LockoutConfig,

    /// Session lifetime policy.
    pub session: SessionConfig,

    /// Two-factor policy.
    pub two_factor: TwoFactorConfig,

    /// Recovery policy.
    pub recovery: RecoveryConfig,

    /// Credential verification policy.
    pub credential: CredentialConfig,
}

impl AuthConfig {
    /// Create a configuration with default policy throughout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lockout: LockoutConfig::new(),
            session: SessionConfig::new(),
            two_factor: TwoFactorConfig::new(),
            recovery: RecoveryConfig::new(),
            credential: CredentialConfig::new(),
        }
    }

    /// Replace the lockout policy.
    #[must_use]
    pub fn with_lockout(mut self, lockout: LockoutConfig) -> Self {
        self.lockout = lockout;
        self
    }

    /// Replace the session policy.
    #[must_use]
    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Replace the two-factor policy.
    #[must_use]
    pub fn with_two_factor(mut self, two_factor: TwoFactorConfig) -> Self {
        self.two_factor = two_factor;
        self
    }

    /// Replace the recovery policy.
    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    /// Replace the credential policy.
    #[must_use]
    pub fn with_credential(mut self, credential: CredentialConfig) -> Self {
        self.credential = credential;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_config_builder() {
        let config = LockoutConfig::new()
            .with_max_failed_attempts(3)
            .with_window(Duration::minutes(5));

        assert_eq!(config.max_failed_attempts, 3);
        assert_eq!(config.window, Duration::minutes(5));
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::new()
            .with_idle_timeout(Duration::minutes(10))
            .with_renewal_threshold(Duration::minutes(2));

        assert_eq!(config.idle_timeout, Duration::minutes(10));
        assert_eq!(config.renewal_threshold, Duration::minutes(2));
        assert_eq!(config.remember_me_duration, Duration::days(7));
    }

    #[test]
    fn test_recovery_token_length_clamped() {
        let config = RecoveryConfig::new().with_token_length(16);
        assert_eq!(config.token_length, 32);

        let config = RecoveryConfig::new().with_token_length(64);
        assert_eq!(config.token_length, 64);
    }

    #[test]
    fn test_default_configs() {
        let config = AuthConfig::default();
        assert_eq!(config.lockout.max_failed_attempts, 5);
        assert_eq!(config.lockout.window, Duration::minutes(15));
        assert_eq!(config.session.idle_timeout, Duration::minutes(30));
        assert_eq!(config.session.remember_me_duration, Duration::days(7));
        assert_eq!(config.session.renewal_threshold, Duration::minutes(5));
        assert_eq!(config.two_factor.code_ttl, Duration::minutes(5));
        assert_eq!(config.two_factor.max_attempts, 3);
        assert_eq!(config.two_factor.pending_ttl, Duration::minutes(10));
        assert_eq!(config.recovery.token_ttl, Duration::minutes(30));
        assert_eq!(config.recovery.token_length, 32);
        assert_eq!(
            config.credential.verify_floor,
            std::time::Duration::from_secs(1)
        );
    }
}
