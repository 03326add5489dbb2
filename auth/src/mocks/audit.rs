//! Mock audit sink for testing.

use crate::events::AuthEvent;
use crate::providers::AuditSink;
use std::sync::{Arc, Mutex};

/// Capturing audit sink.
///
/// Collects events in order so tests can assert on the audit trail.
#[derive(Debug, Clone, Default)]
pub struct MockAuditSink {
    events: Arc<Mutex<Vec<AuthEvent>>>,
}

impl MockAuditSink {
    /// Create a capturing sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, in order.
    #[must_use]
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// The `kind()` of every captured event, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.events()
            .iter()
            .map(|e| e.kind().to_string())
            .collect()
    }

    /// Drop all captured events.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl AuditSink for MockAuditSink {
    async fn record(&self, event: AuthEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
