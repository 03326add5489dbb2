//! Console delivery channel for development and testing.

use crate::error::Result;
use crate::providers::DeliveryChannel;
use chrono::{DateTime, Utc};
use tracing::info;

/// Console delivery channel.
///
/// Logs codes and recovery tokens instead of sending them. Useful for
/// development where no real transport is wired up.
#[derive(Clone, Debug, Default)]
pub struct ConsoleDelivery;

impl ConsoleDelivery {
    /// Create a new console delivery channel.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DeliveryChannel for ConsoleDelivery {
    async fn deliver_code(
        &self,
        identity_key: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes();

        info!(
            identity_key = %identity_key,
            code = %code,
            expires_in_minutes = expires_minutes,
            "📟 Two-factor code (development mode)"
        );

        Ok(())
    }

    async fn deliver_recovery_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let expires_minutes = (expires_at - Utc::now()).num_minutes();

        info!(
            to = %email,
            token = %token,
            expires_in_minutes = expires_minutes,
            "📧 Password recovery token (development mode)"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_delivery_always_succeeds() {
        let delivery = ConsoleDelivery::new();
        let expires_at = Utc::now() + chrono::Duration::minutes(5);

        delivery.deliver_code("alice", "123456", expires_at).await.unwrap();
        delivery
            .deliver_recovery_token("alice@example.com", &"t".repeat(32), expires_at)
            .await
            .unwrap();
    }
}
