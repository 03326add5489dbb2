//! Session lifecycle integration tests: idle timeout, activity renewal,
//! remember-me absolute expiry, and the background timers.
//!
//! Windows are scaled down to milliseconds through the config layer; the
//! proportions mirror the production policy (activity just before the
//! idle deadline keeps the session alive, silence past it does not).

mod common;

use common::setup;
use warden_auth::providers::SessionStore;
use warden_auth::{AuthConfig, SessionConfig};

fn short_sessions(idle_ms: i64, threshold_ms: i64, remember_ms: i64) -> AuthConfig {
    AuthConfig::new().with_session(
        SessionConfig::new()
            .with_idle_timeout(chrono::Duration::milliseconds(idle_ms))
            .with_renewal_threshold(chrono::Duration::milliseconds(threshold_ms))
            .with_remember_me_duration(chrono::Duration::milliseconds(remember_ms))
            .with_sweep_interval(chrono::Duration::milliseconds(50)),
    )
}

#[tokio::test]
async fn test_activity_before_deadline_keeps_session_alive() {
    // 300ms idle timeout standing in for 30 minutes; activity arrives at
    // the 200ms mark (the "29th minute") and resets the clock.
    let ctx = setup(short_sessions(300, 150, 5000)).await;

    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let renewed = ctx.auth.record_activity().await.unwrap();
    assert!(renewed, "activity inside the renewal threshold extends expiry");

    // Well past the original deadline, but inside the renewed one
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_silence_past_deadline_expires_session() {
    let ctx = setup(short_sessions(150, 50, 5000)).await;

    let session = ctx.auth.login("admin", "Hunter42x", false).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    assert!(!ctx.auth.is_authenticated().await);
    // The idle watch destroyed the record and audited the expiry
    assert!(ctx.sessions.get_session(session.session_id).await.unwrap().is_none());
    assert!(ctx.audit.kinds().contains(&"session_expired".to_string()));
}

#[tokio::test]
async fn test_activity_on_expired_session_is_a_no_op() {
    let ctx = setup(short_sessions(80, 40, 5000)).await;

    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    // The activity event lost the race: the session stays expired
    let renewed = ctx.auth.record_activity().await.unwrap();
    assert!(!renewed);
    assert!(!ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_activity_far_from_deadline_writes_nothing() {
    let ctx = setup(short_sessions(5000, 100, 10000)).await;

    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();

    // Plenty of time left: renewal would be a needless write
    let renewed = ctx.auth.record_activity().await.unwrap();
    assert!(!renewed);
    assert!(ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_remember_me_ignores_idle_timeout() {
    // Idle timeout far shorter than the remember-me lifetime: the session
    // must outlive several idle windows without any activity.
    let ctx = setup(short_sessions(80, 40, 400)).await;

    let session = ctx.auth.login("admin", "Hunter42x", true).await.unwrap();
    assert!(!session.renewable);

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(ctx.auth.is_authenticated().await);

    // Activity never slides a remember-me session
    let renewed = ctx.auth.record_activity().await.unwrap();
    assert!(!renewed);
}

#[tokio::test]
async fn test_remember_me_expires_at_absolute_deadline() {
    let ctx = setup(short_sessions(80, 40, 250)).await;

    ctx.auth.login("admin", "Hunter42x", true).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    assert!(!ctx.auth.is_authenticated().await);
    assert_eq!(ctx.sessions.session_count().unwrap(), 0);
}

#[tokio::test]
async fn test_renewal_sweep_keeps_active_session_alive() {
    // Threshold equal to the idle timeout means every sweep tick renews,
    // standing in for a busy context that never goes idle.
    let ctx = setup(short_sessions(200, 200, 5000)).await;

    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();
    let sweep = ctx.auth.spawn_renewal_sweep();

    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    assert!(
        ctx.auth.is_authenticated().await,
        "sweep renewals outlive the idle timeout"
    );
    assert!(ctx.audit.kinds().contains(&"session_renewed".to_string()));

    // With the sweep cancelled the idle timeout applies again
    sweep.cancel();
    tokio::time::sleep(std::time::Duration::from_millis(350)).await;
    assert!(!ctx.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_logout_cancels_idle_watch() {
    let ctx = setup(short_sessions(100, 50, 5000)).await;

    ctx.auth.login("admin", "Hunter42x", false).await.unwrap();
    ctx.auth.logout(Some("done")).await;

    ctx.audit.clear();
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    // No stray expiry from a leaked timer after logout
    assert!(!ctx.audit.kinds().contains(&"session_expired".to_string()));
}

#[tokio::test]
async fn test_expiry_invariant_holds_for_both_shapes() {
    let ctx = setup(AuthConfig::new()).await;

    let sliding = ctx.auth.login("admin", "Hunter42x", false).await.unwrap();
    assert!(sliding.expires_at > sliding.issued_at);

    let remembered = ctx.auth.login("admin", "Hunter42x", true).await.unwrap();
    assert!(remembered.expires_at > remembered.issued_at);
    assert!(
        remembered.expires_at - remembered.issued_at
            > sliding.expires_at - sliding.issued_at
    );
}
