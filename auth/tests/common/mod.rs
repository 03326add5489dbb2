//! Shared test harness: a facade wired to in-memory stores and mocks.

// Each test binary uses a different slice of the harness.
#![allow(dead_code)]

use warden_auth::mocks::{
    MockAuditSink, MockCredentialStore, MockDeliveryChannel, MockPasswordHasher,
};
use warden_auth::state::{Identity, IdentityId, Role};
use warden_auth::stores::{
    MemoryFailedAttemptStore, MemoryRecoveryTokenStore, MemorySessionStore, MemoryTwoFactorStore,
};
use warden_auth::{AuthConfig, AuthEnvironment, AuthFacade, CredentialConfig};

pub type TestFacade = AuthFacade<
    MockCredentialStore,
    MockPasswordHasher,
    MemorySessionStore,
    MemoryFailedAttemptStore,
    MemoryTwoFactorStore,
    MemoryRecoveryTokenStore,
    MockDeliveryChannel,
    MockAuditSink,
>;

/// Everything a test needs to drive the facade and observe side effects.
pub struct TestContext {
    pub auth: TestFacade,
    pub credentials: MockCredentialStore,
    pub hasher: MockPasswordHasher,
    pub sessions: MemorySessionStore,
    pub delivery: MockDeliveryChannel,
    pub audit: MockAuditSink,
}

pub fn identity(username: &str, email: &str, role: Role) -> Identity {
    Identity {
        id: IdentityId::new(),
        username: username.to_string(),
        display_name: username.to_string(),
        email: email.to_string(),
        role,
        enabled: true,
    }
}

/// Build a facade with the given config (verify floor shrunk for tests)
/// and two seeded accounts: admin/Hunter42x and alice/sw0rdfish1.
///
/// Set `RUST_LOG=warden_auth=debug` to see the core's tracing output.
pub async fn setup(config: AuthConfig) -> TestContext {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = config.with_credential(
        CredentialConfig::new().with_verify_floor(std::time::Duration::from_millis(5)),
    );

    let credentials = MockCredentialStore::new();
    let hasher = MockPasswordHasher::new();
    credentials
        .create_account(
            identity("admin", "admin@example.com", Role::Admin),
            "Hunter42x",
            &hasher,
        )
        .await
        .unwrap();
    credentials
        .create_account(
            identity("alice", "alice@example.com", Role::Member),
            "sw0rdfish1",
            &hasher,
        )
        .await
        .unwrap();

    let sessions = MemorySessionStore::new();
    let delivery = MockDeliveryChannel::new();
    let audit = MockAuditSink::new();

    let env = AuthEnvironment::new(
        credentials.clone(),
        hasher.clone(),
        sessions.clone(),
        MemoryFailedAttemptStore::new(),
        MemoryTwoFactorStore::new(),
        MemoryRecoveryTokenStore::new(),
        delivery.clone(),
        audit.clone(),
    );

    TestContext {
        auth: AuthFacade::new(env, config),
        credentials,
        hasher,
        sessions,
        delivery,
        audit,
    }
}
