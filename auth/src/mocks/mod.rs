//! Mock collaborator implementations for testing.
//!
//! This module provides simple, in-memory implementations of the external
//! collaborator traits for use in unit and integration tests. The owned
//! state stores (sessions, attempts, challenges, tokens) already have
//! in-memory backends in [`crate::stores`]; the mocks here cover the
//! collaborators a deployment would wire to real services.

pub mod audit;
pub mod credential_store;
pub mod delivery;
pub mod hasher;

pub use audit::MockAuditSink;
pub use credential_store::MockCredentialStore;
pub use delivery::{DeliveredCode, DeliveredToken, MockDeliveryChannel};
pub use hasher::MockPasswordHasher;
