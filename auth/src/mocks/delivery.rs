//! Mock delivery channel for testing.

use crate::error::{AuthError, Result};
use crate::providers::DeliveryChannel;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// A captured two-factor code delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredCode {
    /// Identity key the code was addressed to.
    pub identity_key: String,
    /// The code itself.
    pub code: String,
    /// Code expiry at delivery time.
    pub expires_at: DateTime<Utc>,
}

/// A captured recovery token delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredToken {
    /// Email address the token was addressed to.
    pub email: String,
    /// The token itself.
    pub token: String,
    /// Token expiry at delivery time.
    pub expires_at: DateTime<Utc>,
}

/// Capturing delivery channel.
///
/// Records everything handed to it so tests can read codes and tokens
/// back out instead of parsing log output. Can be switched to fail on
/// demand to exercise delivery-failure paths.
#[derive(Debug, Clone, Default)]
pub struct MockDeliveryChannel {
    codes: Arc<Mutex<Vec<DeliveredCode>>>,
    tokens: Arc<Mutex<Vec<DeliveredToken>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockDeliveryChannel {
    /// Create a capturing channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent deliveries fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut fail) = self.fail.lock() {
            *fail = failing;
        }
    }

    /// All captured code deliveries, in order.
    #[must_use]
    pub fn sent_codes(&self) -> Vec<DeliveredCode> {
        self.codes.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// All captured token deliveries, in order.
    #[must_use]
    pub fn sent_tokens(&self) -> Vec<DeliveredToken> {
        self.tokens.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// The most recently delivered code, if any.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.sent_codes().last().map(|c| c.code.clone())
    }

    /// The most recently delivered token, if any.
    #[must_use]
    pub fn last_token(&self) -> Option<String> {
        self.sent_tokens().last().map(|t| t.token.clone())
    }

    fn check_failing(&self) -> Result<()> {
        let failing = self.fail.lock().map(|f| *f).unwrap_or(false);
        if failing {
            return Err(AuthError::DeliveryFailed);
        }
        Ok(())
    }
}

impl DeliveryChannel for MockDeliveryChannel {
    async fn deliver_code(
        &self,
        identity_key: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_failing()?;
        self.codes
            .lock()
            .map_err(|_| AuthError::DeliveryFailed)?
            .push(DeliveredCode {
                identity_key: identity_key.to_string(),
                code: code.to_string(),
                expires_at,
            });
        Ok(())
    }

    async fn deliver_recovery_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_failing()?;
        self.tokens
            .lock()
            .map_err(|_| AuthError::DeliveryFailed)?
            .push(DeliveredToken {
                email: email.to_string(),
                token: token.to_string(),
                expires_at,
            });
        Ok(())
    }
}
