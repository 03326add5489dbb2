//! Password-recovery token lifecycle.
//!
//! `request` always reports success, whether or not the email resolves to
//! an identity — recovery must not become a username oracle. Redemption is
//! atomic and single-use: the token is deleted in the same logical step
//! that validates it, before the password reset proceeds, so a token can
//! never be replayed even if the reset fails partway.

use crate::config::RecoveryConfig;
use crate::error::{AuthError, Result};
use crate::events::AuthEvent;
use crate::providers::{
    AuditSink, Credential, CredentialStore, DeliveryChannel, PasswordHasher, RecoveryTokenRecord,
    RecoveryTokenStore,
};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Generate an opaque alphanumeric token.
fn generate_token(length: usize) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Check the password strength policy: minimum length, at least one
/// letter and one digit.
fn check_password_strength(password: &str, min_length: usize) -> Result<()> {
    if password.len() < min_length {
        return Err(AuthError::WeakPassword {
            reason: format!("must be at least {min_length} characters"),
        });
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(AuthError::WeakPassword {
            reason: "must contain at least one letter".to_string(),
        });
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword {
            reason: "must contain at least one digit".to_string(),
        });
    }
    Ok(())
}

/// Password-recovery service.
#[derive(Debug, Clone)]
pub struct RecoveryService<C, H, T, D, A> {
    credentials: C,
    hasher: H,
    tokens: T,
    delivery: D,
    audit: A,
    config: RecoveryConfig,
}

impl<C, H, T, D, A> RecoveryService<C, H, T, D, A>
where
    C: CredentialStore + Clone,
    H: PasswordHasher + Clone,
    T: RecoveryTokenStore + Clone,
    D: DeliveryChannel + Clone,
    A: AuditSink + Clone,
{
    /// Create a service over the given collaborators.
    #[must_use]
    pub const fn new(
        credentials: C,
        hasher: H,
        tokens: T,
        delivery: D,
        audit: A,
        config: RecoveryConfig,
    ) -> Self {
        Self {
            credentials,
            hasher,
            tokens,
            delivery,
            audit,
            config,
        }
    }

    /// Handle a recovery request.
    ///
    /// Always returns `Ok(())` for a handled request, whether or not the
    /// email is registered. When it is, a token is stored and handed to
    /// the delivery channel; a delivery failure is logged and audited but
    /// still reported as success, because surfacing it would reveal that
    /// the address exists.
    ///
    /// # Errors
    ///
    /// Returns error only if the credential or token store fails.
    pub async fn request(&self, email: &str) -> Result<()> {
        let email = email.trim().to_lowercase();
        let identity = self.credentials.find_by_email(&email).await?;

        let token_issued = if identity.is_some() {
            let now = Utc::now();
            let record = RecoveryTokenRecord {
                token: generate_token(self.config.token_length),
                email: email.clone(),
                expires_at: now + self.config.token_ttl,
                created_at: now,
            };
            self.tokens.store_token(record.clone()).await?;

            debug!(email = %email, expires_at = %record.expires_at, "recovery token issued");
            if let Err(e) = self
                .delivery
                .deliver_recovery_token(&email, &record.token, record.expires_at)
                .await
            {
                warn!(email = %email, error = %e, "recovery delivery failed");
                self.audit
                    .record(AuthEvent::StoreFailure {
                        context: "recovery token delivery".to_string(),
                        timestamp: Utc::now(),
                    })
                    .await;
            }
            true
        } else {
            debug!(email = %email, "recovery requested for unknown email");
            false
        };

        self.audit
            .record(AuthEvent::RecoveryRequested {
                email,
                token_issued,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }

    /// Validate a token without consuming it.
    ///
    /// Returns the email the token is bound to.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenNotFound`] if no such token exists
    /// - [`AuthError::TokenExpired`] if the token is past its expiry
    /// - [`AuthError::Store`] if the token store fails
    pub async fn validate_token(&self, token: &str) -> Result<String> {
        let Some(record) = self.tokens.peek_token(token).await? else {
            return Err(AuthError::TokenNotFound);
        };

        if Utc::now() > record.expires_at {
            // Dead either way; drop the record on the way out.
            self.tokens.consume_token(token).await?;
            return Err(AuthError::TokenExpired);
        }

        Ok(record.email)
    }

    /// Redeem a token and reset the password.
    ///
    /// Strength is checked first so a weak password does not burn the
    /// token. The token is then consumed atomically **before** the
    /// credential write: a reset that fails after redemption is reported,
    /// but the token is not restored.
    ///
    /// # Errors
    ///
    /// - [`AuthError::WeakPassword`] if the new password fails the policy
    /// - [`AuthError::TokenNotFound`] / [`AuthError::TokenExpired`] on a
    ///   dead token
    /// - [`AuthError::Internal`] if the email no longer resolves to an
    ///   identity after redemption
    /// - [`AuthError::Store`] if a collaborator fails
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        check_password_strength(new_password, self.config.min_password_length)?;

        let Some(record) = self.tokens.consume_token(token).await? else {
            return Err(AuthError::TokenNotFound);
        };

        if Utc::now() > record.expires_at {
            return Err(AuthError::TokenExpired);
        }

        self.audit
            .record(AuthEvent::RecoveryTokenRedeemed {
                email: record.email.clone(),
                timestamp: Utc::now(),
            })
            .await;

        let Some(identity) = self.credentials.find_by_email(&record.email).await? else {
            warn!(email = %record.email, "redeemed token for vanished identity");
            self.audit
                .record(AuthEvent::StoreFailure {
                    context: "password reset after redemption".to_string(),
                    timestamp: Utc::now(),
                })
                .await;
            return Err(AuthError::Internal);
        };

        let digest = self.hasher.hash_password(new_password).await?;
        self.credentials
            .update_credential(&Credential {
                identity_id: identity.id,
                password_hash: digest.hash,
                password_salt: digest.salt,
            })
            .await?;

        info!(identity_id = %identity.id, "password reset completed");
        self.audit
            .record(AuthEvent::PasswordReset {
                identity_id: identity.id,
                timestamp: Utc::now(),
            })
            .await;

        Ok(())
    }
}
