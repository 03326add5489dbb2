//! Authentication environment.
//!
//! This module defines the dependency-injection bundle handed to
//! [`crate::facade::AuthFacade`]. There is no ambient global state: every
//! collaborator is an explicit, substitutable dependency, which is what
//! lets the whole core run against in-memory fakes in tests.

use crate::providers::{
    AuditSink, CredentialStore, DeliveryChannel, FailedAttemptStore, PasswordHasher,
    RecoveryTokenStore, SessionStore, TwoFactorStore,
};

/// Authentication environment.
///
/// Contains all external dependencies needed by the auth core.
///
/// # Type Parameters
///
/// - `C`: credential store
/// - `H`: password hasher
/// - `S`: session store
/// - `F`: failed-attempt store
/// - `T`: two-factor challenge store
/// - `R`: recovery token store
/// - `D`: delivery channel
/// - `A`: audit sink
#[derive(Clone)]
pub struct AuthEnvironment<C, H, S, F, T, R, D, A>
where
    C: CredentialStore + Clone,
    H: PasswordHasher + Clone,
    S: SessionStore + Clone,
    F: FailedAttemptStore + Clone,
    T: TwoFactorStore + Clone,
    R: RecoveryTokenStore + Clone,
    D: DeliveryChannel + Clone,
    A: AuditSink + Clone,
{
    /// Credential store (external; consumed, not owned).
    pub credentials: C,

    /// Password hasher (pluggable KDF).
    pub hasher: H,

    /// Session store (durability layer).
    pub sessions: S,

    /// Failed-attempt store (lockout counters).
    pub attempts: F,

    /// Two-factor challenge store.
    pub challenges: T,

    /// Recovery token store.
    pub recovery_tokens: R,

    /// Delivery channel (codes and recovery links).
    pub delivery: D,

    /// Audit sink (external; events only flow outward).
    pub audit: A,
}

impl<C, H, S, F, T, R, D, A> AuthEnvironment<C, H, S, F, T, R, D, A>
where
    C: CredentialStore + Clone,
    H: PasswordHasher + Clone,
    S: SessionStore + Clone,
    F: FailedAttemptStore + Clone,
    T: TwoFactorStore + Clone,
    R: RecoveryTokenStore + Clone,
    D: DeliveryChannel + Clone,
    A: AuditSink + Clone,
{
    /// Create a new authentication environment.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: C,
        hasher: H,
        sessions: S,
        attempts: F,
        challenges: T,
        recovery_tokens: R,
        delivery: D,
        audit: A,
    ) -> Self {
        Self {
            credentials,
            hasher,
            sessions,
            attempts,
            challenges,
            recovery_tokens,
            delivery,
            audit,
        }
    }
}
