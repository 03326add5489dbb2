//! Two-factor challenge lifecycle.
//!
//! Codes are 6 random decimal digits with a 5-minute TTL and a budget of
//! 3 validation attempts. A challenge is single-use: destroyed on success,
//! on expiry, or when the budget is spent — after which the login flow
//! must restart from credential verification.
//!
//! Two-factor failures are deliberately **not** routed through the
//! lockout guard: password-guessing lockout and code-replay protection
//! are different threat models with different windows.

use crate::config::TwoFactorConfig;
use crate::error::{AuthError, Result};
use crate::events::AuthEvent;
use crate::providers::{
    AuditSink, ChallengeOutcome, DeliveryChannel, TwoFactorChallengeRecord, TwoFactorStore,
};
use chrono::Utc;
use tracing::{debug, warn};

/// Generate a 6-digit decimal code.
fn generate_code() -> String {
    use rand::Rng;

    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Two-factor challenge service.
#[derive(Debug, Clone)]
pub struct TwoFactorService<T, D, A> {
    challenges: T,
    delivery: D,
    audit: A,
    config: TwoFactorConfig,
}

impl<T, D, A> TwoFactorService<T, D, A>
where
    T: TwoFactorStore + Clone,
    D: DeliveryChannel + Clone,
    A: AuditSink + Clone,
{
    /// Create a service over the given challenge store and delivery channel.
    #[must_use]
    pub const fn new(challenges: T, delivery: D, audit: A, config: TwoFactorConfig) -> Self {
        Self {
            challenges,
            delivery,
            audit,
            config,
        }
    }

    /// The configured policy.
    #[must_use]
    pub const fn config(&self) -> &TwoFactorConfig {
        &self.config
    }

    /// Issue a fresh challenge for an identity key.
    ///
    /// Any pending challenge for the same key is replaced — no two pending
    /// challenges coexist for one identity.
    ///
    /// # Errors
    ///
    /// Returns error if the challenge store fails.
    pub async fn issue(&self, identity_key: &str) -> Result<TwoFactorChallengeRecord> {
        let challenge = TwoFactorChallengeRecord {
            identity_key: identity_key.to_string(),
            code: generate_code(),
            expires_at: Utc::now() + self.config.code_ttl,
            remaining_attempts: self.config.max_attempts,
        };

        self.challenges.store_challenge(challenge.clone()).await?;

        debug!(
            identity_key = %identity_key,
            expires_at = %challenge.expires_at,
            "two-factor challenge issued"
        );
        self.audit
            .record(AuthEvent::TwoFactorIssued {
                identity_key: identity_key.to_string(),
                expires_at: challenge.expires_at,
                timestamp: Utc::now(),
            })
            .await;

        Ok(challenge)
    }

    /// Hand a challenge code to the external delivery channel.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DeliveryFailed`] if the channel rejects or
    /// fails the request.
    pub async fn deliver(&self, challenge: &TwoFactorChallengeRecord) -> Result<()> {
        self.delivery
            .deliver_code(
                &challenge.identity_key,
                &challenge.code,
                challenge.expires_at,
            )
            .await
            .map_err(|e| {
                warn!(identity_key = %challenge.identity_key, error = %e, "code delivery failed");
                AuthError::DeliveryFailed
            })
    }

    /// Validate a submitted code.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ChallengeMismatch`] on a wrong code with attempts left
    /// - [`AuthError::ChallengeExhausted`] on the last wrong attempt
    /// - [`AuthError::ChallengeExpired`] when no live challenge exists
    ///   (expired, already consumed, or never issued)
    /// - [`AuthError::Store`] if the challenge store fails
    pub async fn validate(&self, identity_key: &str, submitted: &str) -> Result<()> {
        let outcome = self.challenges.validate_code(identity_key, submitted).await?;
        let now = Utc::now();

        match outcome {
            ChallengeOutcome::Accepted => {
                debug!(identity_key = %identity_key, "two-factor code accepted");
                self.audit
                    .record(AuthEvent::TwoFactorVerified {
                        identity_key: identity_key.to_string(),
                        timestamp: now,
                    })
                    .await;
                Ok(())
            }
            ChallengeOutcome::Mismatch { remaining_attempts } => {
                debug!(
                    identity_key = %identity_key,
                    remaining_attempts,
                    "two-factor code mismatch"
                );
                self.audit
                    .record(AuthEvent::TwoFactorFailed {
                        identity_key: identity_key.to_string(),
                        remaining_attempts,
                        timestamp: now,
                    })
                    .await;
                Err(AuthError::ChallengeMismatch { remaining_attempts })
            }
            ChallengeOutcome::Exhausted => {
                warn!(identity_key = %identity_key, "two-factor challenge exhausted");
                self.audit
                    .record(AuthEvent::TwoFactorExhausted {
                        identity_key: identity_key.to_string(),
                        timestamp: now,
                    })
                    .await;
                Err(AuthError::ChallengeExhausted)
            }
            ChallengeOutcome::Missing => Err(AuthError::ChallengeExpired),
        }
    }

    /// Drop any pending challenge for a key (flow abandoned or superseded).
    ///
    /// # Errors
    ///
    /// Returns error if the challenge store fails.
    pub async fn cancel(&self, identity_key: &str) -> Result<()> {
        self.challenges.delete_challenge(identity_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockAuditSink, MockDeliveryChannel};
    use crate::stores::MemoryTwoFactorStore;
    use chrono::Duration;

    fn service() -> (
        TwoFactorService<MemoryTwoFactorStore, MockDeliveryChannel, MockAuditSink>,
        MockDeliveryChannel,
        MockAuditSink,
    ) {
        let delivery = MockDeliveryChannel::new();
        let audit = MockAuditSink::new();
        let service = TwoFactorService::new(
            MemoryTwoFactorStore::new(),
            delivery.clone(),
            audit.clone(),
            TwoFactorConfig::new(),
        );
        (service, delivery, audit)
    }

    #[test]
    fn test_generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_issue_deliver_validate_round_trip() {
        let (service, delivery, audit) = service();

        let challenge = service.issue("alice").await.unwrap();
        service.deliver(&challenge).await.unwrap();

        let delivered = delivery.sent_codes();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].code, challenge.code);

        service.validate("alice", &challenge.code).await.unwrap();
        assert!(audit.kinds().contains(&"two_factor_verified".to_string()));
    }

    #[tokio::test]
    async fn test_code_accepted_at_most_once() {
        let (service, _, _) = service();

        let challenge = service.issue("alice").await.unwrap();
        service.validate("alice", &challenge.code).await.unwrap();

        // Replay with the correct value fails: challenge destroyed on success
        assert_eq!(
            service.validate("alice", &challenge.code).await.unwrap_err(),
            AuthError::ChallengeExpired
        );
    }

    #[tokio::test]
    async fn test_third_wrong_attempt_exhausts() {
        let (service, _, audit) = service();

        let challenge = service.issue("alice").await.unwrap();
        let wrong = if challenge.code == "000000" { "111111" } else { "000000" };

        assert_eq!(
            service.validate("alice", wrong).await.unwrap_err(),
            AuthError::ChallengeMismatch {
                remaining_attempts: 2
            }
        );
        assert_eq!(
            service.validate("alice", wrong).await.unwrap_err(),
            AuthError::ChallengeMismatch {
                remaining_attempts: 1
            }
        );
        assert_eq!(
            service.validate("alice", wrong).await.unwrap_err(),
            AuthError::ChallengeExhausted
        );

        // Even the right code is dead now
        assert_eq!(
            service.validate("alice", &challenge.code).await.unwrap_err(),
            AuthError::ChallengeExpired
        );
        assert!(audit.kinds().contains(&"two_factor_exhausted".to_string()));
    }

    #[tokio::test]
    async fn test_expired_challenge_requires_restart() {
        let delivery = MockDeliveryChannel::new();
        let audit = MockAuditSink::new();
        let service = TwoFactorService::new(
            MemoryTwoFactorStore::new(),
            delivery,
            audit,
            TwoFactorConfig::new().with_code_ttl(Duration::milliseconds(30)),
        );

        let challenge = service.issue("alice").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;

        assert_eq!(
            service.validate("alice", &challenge.code).await.unwrap_err(),
            AuthError::ChallengeExpired
        );
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous_challenge() {
        let (service, _, _) = service();

        let first = service.issue("alice").await.unwrap();
        let second = service.issue("alice").await.unwrap();

        if first.code != second.code {
            let err = service.validate("alice", &first.code).await.unwrap_err();
            assert!(matches!(
                err,
                AuthError::ChallengeMismatch { .. } | AuthError::ChallengeExhausted
            ));
        }
        service.validate("alice", &second.code).await.unwrap();
    }
}
