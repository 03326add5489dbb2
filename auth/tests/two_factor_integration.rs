//! Two-factor login flow integration tests.

mod common;

use common::setup;
use warden_auth::{AuthConfig, AuthError, TwoFactorConfig};

#[tokio::test]
async fn test_two_factor_login_happy_path() {
    let ctx = setup(AuthConfig::new()).await;

    let pending = ctx
        .auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    assert!(pending.expires_at > chrono::Utc::now());

    // Primary success alone is not authenticated
    assert!(!ctx.auth.is_authenticated().await);

    let code = ctx.delivery.last_code().unwrap();
    let session = ctx.auth.complete_two_factor_login(&code).await.unwrap();

    assert_eq!(session.identity.username, "admin");
    assert!(ctx.auth.is_authenticated().await);

    let kinds = ctx.audit.kinds();
    assert!(kinds.contains(&"two_factor_issued".to_string()));
    assert!(kinds.contains(&"two_factor_verified".to_string()));
    assert!(kinds.contains(&"login_succeeded".to_string()));
}

#[tokio::test]
async fn test_wrong_credentials_never_reach_the_challenge_step() {
    let ctx = setup(AuthConfig::new()).await;

    let err = ctx
        .auth
        .login_with_two_factor("admin", "wrongpass", false)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidCredentials);
    assert!(ctx.delivery.sent_codes().is_empty());
}

#[tokio::test]
async fn test_code_is_single_use() {
    let ctx = setup(AuthConfig::new()).await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();

    ctx.auth.complete_two_factor_login(&code).await.unwrap();

    // Replaying the same correct code fails: the challenge was destroyed
    // on first success and there is no pending flow anymore
    assert_eq!(
        ctx.auth.complete_two_factor_login(&code).await.unwrap_err(),
        AuthError::ChallengeExpired
    );
}

#[tokio::test]
async fn test_three_wrong_codes_force_a_restart() {
    let ctx = setup(AuthConfig::new()).await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    assert_eq!(
        ctx.auth.complete_two_factor_login(wrong).await.unwrap_err(),
        AuthError::ChallengeMismatch {
            remaining_attempts: 2
        }
    );
    assert_eq!(
        ctx.auth.complete_two_factor_login(wrong).await.unwrap_err(),
        AuthError::ChallengeMismatch {
            remaining_attempts: 1
        }
    );
    assert_eq!(
        ctx.auth.complete_two_factor_login(wrong).await.unwrap_err(),
        AuthError::ChallengeExhausted
    );

    // The pending flow is gone; even the right code cannot resume it
    assert_eq!(
        ctx.auth.complete_two_factor_login(&code).await.unwrap_err(),
        AuthError::ChallengeExpired
    );
    assert!(!ctx.auth.is_authenticated().await);

    // The full flow works again from credential verification
    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let fresh = ctx.delivery.last_code().unwrap();
    ctx.auth.complete_two_factor_login(&fresh).await.unwrap();
    assert!(ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_expired_code_requires_restart() {
    let ctx = setup(
        AuthConfig::new().with_two_factor(
            TwoFactorConfig::new().with_code_ttl(chrono::Duration::milliseconds(50)),
        ),
    )
    .await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert_eq!(
        ctx.auth.complete_two_factor_login(&code).await.unwrap_err(),
        AuthError::ChallengeExpired
    );
}

#[tokio::test]
async fn test_pending_deadline_bounds_the_whole_flow() {
    // The pending state has its own deadline, independent of the code TTL:
    // here the code outlives the flow.
    let ctx = setup(
        AuthConfig::new().with_two_factor(
            TwoFactorConfig::new()
                .with_code_ttl(chrono::Duration::seconds(300))
                .with_pending_ttl(chrono::Duration::milliseconds(60)),
        ),
    )
    .await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(120)).await;

    assert_eq!(
        ctx.auth.complete_two_factor_login(&code).await.unwrap_err(),
        AuthError::ChallengeExpired
    );
    assert!(!ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_completing_without_a_pending_flow_fails() {
    let ctx = setup(AuthConfig::new()).await;

    assert_eq!(
        ctx.auth.complete_two_factor_login("123456").await.unwrap_err(),
        AuthError::ChallengeExpired
    );
}

#[tokio::test]
async fn test_new_flow_invalidates_previous_pending_challenge() {
    let ctx = setup(AuthConfig::new()).await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let first_code = ctx.delivery.last_code().unwrap();

    // Starting over replaces the pending challenge
    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let second_code = ctx.delivery.last_code().unwrap();

    if first_code != second_code {
        let err = ctx
            .auth
            .complete_two_factor_login(&first_code)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::ChallengeMismatch { .. } | AuthError::ChallengeExhausted
        ));
    }

    ctx.auth.complete_two_factor_login(&second_code).await.unwrap();
    assert!(ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_delivery_failure_surfaces_and_leaves_flow_anonymous() {
    let ctx = setup(AuthConfig::new()).await;
    ctx.delivery.set_failing(true);

    let err = ctx
        .auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DeliveryFailed);
    assert!(!ctx.auth.is_authenticated().await);

    // Recovered channel: the flow works end to end
    ctx.delivery.set_failing(false);
    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();
    ctx.auth.complete_two_factor_login(&code).await.unwrap();
}

#[tokio::test]
async fn test_two_factor_failures_do_not_touch_password_lockout() {
    let ctx = setup(AuthConfig::new()).await;

    ctx.auth
        .login_with_two_factor("admin", "Hunter42x", false)
        .await
        .unwrap();
    let code = ctx.delivery.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    // Burn the whole challenge budget
    for _ in 0..3 {
        let _ = ctx.auth.complete_two_factor_login(wrong).await;
    }

    // Password login is unaffected: separate threat model, separate counter
    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();
    assert!(ctx.auth.is_authenticated().await);
}
