//! Delivery channel trait.
//!
//! The core hands one-time codes and recovery tokens to an opaque external
//! channel. The actual transport (SMS, email, push) is intentionally
//! unspecified and must be supplied by an integrator.

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Outbound delivery channel.
///
/// This trait abstracts over notification transports (SMS gateways,
/// email services, push providers).
pub trait DeliveryChannel: Send + Sync {
    /// Deliver a two-factor code to the identity's registered channel.
    ///
    /// # Arguments
    ///
    /// - `identity_key`: normalized identity key the code belongs to
    /// - `code`: the one-time code
    /// - `expires_at`: code expiration timestamp
    ///
    /// # Errors
    ///
    /// Returns error if the transport rejects or fails the request.
    fn deliver_code(
        &self,
        identity_key: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Deliver a password-recovery token to an email address.
    ///
    /// # Errors
    ///
    /// Returns error if the transport rejects or fails the request.
    fn deliver_recovery_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
