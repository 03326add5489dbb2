//! Audit sink trait.

use crate::events::AuthEvent;

/// Audit sink.
///
/// The core emits structured [`AuthEvent`]s to this collaborator; it does
/// not own their storage or retention policy.
///
/// # Implementation Notes
///
/// Recording is infallible from the core's perspective: an audit pipeline
/// that can fail must buffer or drop internally, because authentication
/// outcomes never depend on audit delivery.
pub trait AuditSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: AuthEvent) -> impl std::future::Future<Output = ()> + Send;
}
