//! # Warden Authentication Core
//!
//! Credential verification, session lifecycle, brute-force lockout,
//! two-factor challenges, and password-recovery tokens — the
//! security-sensitive core of an application, with everything around it
//! (record management, rendering, audit storage) treated as an external
//! collaborator.
//!
//! ## Architecture
//!
//! Every dependency is an explicit trait injected through
//! [`AuthEnvironment`]; there is no ambient global state. The
//! [`AuthFacade`] is the single entry point and drives the flow state
//! machine:
//!
//! ```text
//! Anonymous → (Authenticating) → Authenticated → Expired | LoggedOut
//!                    ↘ PendingTwoFactor ↗
//! ```
//!
//! ## Example: Login
//!
//! ```rust
//! use warden_auth::mocks::{
//!     MockAuditSink, MockCredentialStore, MockDeliveryChannel, MockPasswordHasher,
//! };
//! use warden_auth::state::{Identity, IdentityId, Role};
//! use warden_auth::stores::{
//!     MemoryFailedAttemptStore, MemoryRecoveryTokenStore, MemorySessionStore,
//!     MemoryTwoFactorStore,
//! };
//! use warden_auth::{AuthConfig, AuthEnvironment, AuthFacade, CredentialConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> warden_auth::Result<()> {
//! let credentials = MockCredentialStore::new();
//! let hasher = MockPasswordHasher::new();
//! credentials
//!     .create_account(
//!         Identity {
//!             id: IdentityId::new(),
//!             username: "admin".to_string(),
//!             display_name: "Administrator".to_string(),
//!             email: "admin@example.com".to_string(),
//!             role: Role::Admin,
//!             enabled: true,
//!         },
//!         "Hunter42x",
//!         &hasher,
//!     )
//!     .await?;
//!
//! let env = AuthEnvironment::new(
//!     credentials,
//!     hasher,
//!     MemorySessionStore::new(),
//!     MemoryFailedAttemptStore::new(),
//!     MemoryTwoFactorStore::new(),
//!     MemoryRecoveryTokenStore::new(),
//!     MockDeliveryChannel::new(),
//!     MockAuditSink::new(),
//! );
//! let config = AuthConfig::new().with_credential(
//!     CredentialConfig::new().with_verify_floor(std::time::Duration::from_millis(10)),
//! );
//! let auth = AuthFacade::new(env, config);
//!
//! let session = auth.login("admin", "Hunter42x", false).await?;
//! assert!(auth.is_authenticated().await);
//! assert!(auth.has_permission("accounts.manage").await);
//!
//! auth.logout(Some("done")).await;
//! assert!(!auth.is_authenticated().await);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod events;
pub mod facade;
pub mod lockout;
pub mod mocks;
pub mod providers;
pub mod recovery;
pub mod session;
pub mod state;
pub mod stores;
pub mod two_factor;

// Re-export main types for convenience
pub use config::{
    AuthConfig, CredentialConfig, LockoutConfig, RecoveryConfig, SessionConfig, TwoFactorConfig,
};
pub use credentials::CredentialValidator;
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use events::AuthEvent;
pub use facade::{AuthFacade, TwoFactorPending};
pub use lockout::LockoutGuard;
pub use recovery::RecoveryService;
pub use session::{IntegrityKey, SessionManager, TimerHandle};
pub use state::{AuthFlow, Identity, IdentityId, Role, Session, SessionId};
pub use two_factor::TwoFactorService;
