//! Authentication collaborators.
//!
//! This module defines traits for all external dependencies used by the
//! auth core. These traits enable dependency injection and make the auth
//! logic testable.
//!
//! # Architecture
//!
//! Providers are **interfaces**, not implementations. The components
//! depend on these traits; the application supplies concrete
//! implementations through [`crate::environment::AuthEnvironment`].
//!
//! This enables:
//! - **Testing**: in-memory fakes, deterministic and fast
//! - **Production**: real services (a database-backed credential store,
//!   an SMS/email gateway, a durable audit pipeline)
//! - **Development**: instrumented versions (the bundled console delivery)
//!
//! The backing store is a shared mutable resource keyed by identity;
//! read-modify-write on a single key (failure-count increment, challenge
//! attempt decrement, token consumption) must be atomic inside the store
//! to avoid lost updates under concurrent attempts from multiple contexts.

pub mod attempt_store;
pub mod audit;
pub mod challenge_store;
pub mod console;
pub mod credential_store;
pub mod delivery;
pub mod hasher;
pub mod session_store;
pub mod token_store;

// Re-export provider traits and record types
pub use attempt_store::{FailedAttemptRecord, FailedAttemptStore};
pub use audit::AuditSink;
pub use challenge_store::{ChallengeOutcome, TwoFactorChallengeRecord, TwoFactorStore};
pub use console::ConsoleDelivery;
pub use credential_store::{Credential, CredentialStore};
pub use delivery::DeliveryChannel;
pub use hasher::{Argon2Hasher, PasswordDigest, PasswordHasher};
pub use session_store::SessionStore;
pub use token_store::{RecoveryTokenRecord, RecoveryTokenStore};
