//! Storage backends for the auth core.
//!
//! The core prescribes no storage engine; the bundled backend keeps every
//! collection in process memory behind per-collection mutexes:
//!
//! - **Session Store** — session records keyed by session ID
//! - **Failed-Attempt Store** — lockout counters with atomic increment
//! - **Two-Factor Store** — pending challenges with atomic validation
//! - **Recovery Token Store** — reset tokens with atomic consumption
//!
//! Durable backends (a database, a TTL-capable cache) implement the same
//! traits in `providers/`.

pub mod memory;

// Re-exports
pub use memory::{
    MemoryFailedAttemptStore, MemoryRecoveryTokenStore, MemorySessionStore, MemoryTwoFactorStore,
};
