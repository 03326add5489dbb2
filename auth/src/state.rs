//! Authentication state types.
//!
//! This module defines the core state types for the authentication system:
//! identifier newtypes, the identity snapshot carried by sessions, the
//! session record itself, and the per-execution-context flow state machine.
//! All types are `Clone` to support snapshot semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for an identity (registered principal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityId(pub uuid::Uuid);

impl IdentityId {
    /// Generate a new random `IdentityId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Generate a new random `SessionId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// Role assigned to an identity.
///
/// Permission checks read the role snapshot carried in the session,
/// never a live lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Record management plus reporting.
    Manager,
    /// Read-only record access.
    Member,
}

impl Role {
    /// Get the role name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    /// Permissions granted by this role.
    #[must_use]
    pub const fn permissions(&self) -> &'static [&'static str] {
        match self {
            Self::Admin => &[
                "records.read",
                "records.write",
                "accounts.manage",
                "audit.view",
            ],
            Self::Manager => &["records.read", "records.write"],
            Self::Member => &["records.read"],
        }
    }

    /// Check whether this role grants `permission`.
    #[must_use]
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Identity snapshot.
///
/// Owned by the external credential store; read-only to this core. A copy
/// is frozen into each session at issuance so authorization checks never
/// hit the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity identifier.
    pub id: IdentityId,

    /// Username, unique and matched case-insensitively.
    pub username: String,

    /// Human-readable display name.
    pub display_name: String,

    /// Email address.
    pub email: String,

    /// Assigned role.
    pub role: Role,

    /// Whether the identity may authenticate at all.
    pub enabled: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// A time-bounded proof of a successfully authenticated identity.
///
/// Invariant: `expires_at > issued_at` always. A session is valid iff
/// `now < expires_at` AND the integrity tag matches a recomputation over
/// the identity snapshot (tamper detection for persisted session data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub session_id: SessionId,

    /// Identity snapshot frozen at issuance.
    pub identity: Identity,

    /// Session creation timestamp.
    pub issued_at: DateTime<Utc>,

    /// Session expiration timestamp.
    pub expires_at: DateTime<Utc>,

    /// Whether the expiry slides on activity.
    ///
    /// `true` for idle-timeout sessions (expiry resets on activity),
    /// `false` for remember-me sessions (fixed absolute expiry).
    pub renewable: bool,

    /// Keyed MAC over the session payload (base64url, no padding).
    ///
    /// Computed by the session manager with a process-held key; never
    /// derivable from client-visible data.
    pub integrity_tag: String,
}

impl Session {
    /// Remaining lifetime of this session, clamped at zero.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }

    /// Whether this session is past its expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Flow State Machine
// ═══════════════════════════════════════════════════════════════════════

/// Pending two-factor login state.
///
/// Created after primary credential success when the caller requested a
/// 2FA-gated login. Carries its own expiry, independent of the challenge
/// code's shorter TTL, bounding total flow duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTwoFactor {
    /// Identity that passed primary verification.
    pub identity: Identity,

    /// Remember-me choice made at the initial login call.
    pub remember_me: bool,

    /// When primary verification succeeded.
    pub started_at: DateTime<Utc>,

    /// Absolute deadline for completing the 2FA step.
    pub expires_at: DateTime<Utc>,
}

/// Per-execution-context authentication flow state.
///
/// ```text
/// Anonymous → (Authenticating) → Authenticated → Expired | LoggedOut
///                    ↘ PendingTwoFactor ↗
/// ```
///
/// `Authenticating` is the transient span of a `login*` call and has no
/// stored representation; no transition skips it. `Expired` and
/// `LoggedOut` collapse back to `Anonymous`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthFlow {
    /// No authentication in progress.
    #[default]
    Anonymous,

    /// Primary credentials accepted, waiting for the second factor.
    PendingTwoFactor(PendingTwoFactor),

    /// Fully authenticated with an active session.
    Authenticated(Session),
}

impl AuthFlow {
    /// The active session, if fully authenticated.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}
