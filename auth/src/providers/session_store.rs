//! Session store trait.

use crate::error::Result;
use crate::state::{Session, SessionId};

/// Session store.
///
/// The durability layer behind the per-context session state. Each
/// execution context manages its own current session; the store is where
/// records live between requests.
///
/// # Implementation Notes
///
/// - Sessions are ephemeral; backends with native TTL support may expire
///   records themselves, but the manager re-checks expiry on every read.
/// - The persisted shape is the full [`Session`] record:
///   `{session_id, identity snapshot, issued_at, expires_at, integrity_tag}`.
pub trait SessionStore: Send + Sync {
    /// Persist a newly issued session.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend write fails
    /// - The session ID already exists
    fn create_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a session record.
    ///
    /// Absence is `Ok(None)`; expiry and integrity are the manager's
    /// concern, not the store's.
    ///
    /// # Errors
    ///
    /// Returns error if the backend query fails.
    fn get_session(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<Option<Session>>> + Send;

    /// Overwrite a session record (renewal writes the extended expiry and
    /// recomputed tag).
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The backend write fails
    /// - The session does not exist
    fn update_session(
        &self,
        session: &Session,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete a session record. Deleting an absent session is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the backend write fails.
    fn delete_session(
        &self,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
