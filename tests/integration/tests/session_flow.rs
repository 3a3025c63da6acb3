//! Session lifecycle tests
//!
//! Login, rotation, revocation, activity tracking, and statistics over the
//! in-memory stores. Run with: cargo test -p integration-tests

use chrono::Duration;

use auth_core::{DomainError, Platform, SessionState};
use auth_service::services::{ServiceError, SessionService};
use integration_tests::{device, email_login, mobile_login, unique_email, TestHarness, TEST_PASSWORD};

#[tokio::test]
async fn test_login_returns_token_pair() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let response = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .expect("login succeeds");

    assert!(!response.access_token.is_empty());
    assert!(!response.refresh_token.is_empty());
    assert_eq!(response.token_type, "Bearer");
    assert_eq!(response.expires_in, 900);
    assert_eq!(response.user.id, user.id.to_string());

    // The access token carries the right subject
    let user_id = harness
        .auth()
        .validate_token(&response.access_token)
        .await
        .expect("access token validates");
    assert_eq!(user_id, user.id);
}

#[tokio::test]
async fn test_login_with_mobile_identifier() {
    let harness = TestHarness::new();
    let user = harness
        .create_mobile_user("+91", "9876543210", TEST_PASSWORD)
        .await;

    let response = harness
        .auth()
        .login(
            mobile_login("+919876543210", TEST_PASSWORD),
            device(Platform::Android),
        )
        .await
        .expect("mobile login succeeds");

    assert_eq!(response.user.id, user.id.to_string());
}

#[tokio::test]
async fn test_login_failures_do_not_enumerate() {
    let harness = TestHarness::new();
    let email = unique_email();
    harness.create_user(&email, TEST_PASSWORD).await;

    // Unknown account and wrong password fail with the same code
    let unknown = harness
        .auth()
        .login(
            email_login("nobody@example.com", TEST_PASSWORD),
            device(Platform::Web),
        )
        .await
        .unwrap_err();
    let wrong_password = harness
        .auth()
        .login(email_login(&email, "WrongPass999"), device(Platform::Web))
        .await
        .unwrap_err();

    assert_eq!(unknown.error_code(), "INVALID_CREDENTIALS");
    assert_eq!(wrong_password.error_code(), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_refresh_rotates_and_revokes_old_token() {
    let harness = TestHarness::new();
    let email = unique_email();
    harness.create_user(&email, TEST_PASSWORD).await;

    let first = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Ios))
        .await
        .unwrap();

    let second = harness
        .auth()
        .refresh(&first.refresh_token)
        .await
        .expect("refresh succeeds");

    assert_ne!(first.refresh_token, second.refresh_token);

    // The old value is dead after rotation
    let replay = harness.auth().refresh(&first.refresh_token).await;
    assert!(matches!(
        replay,
        Err(ServiceError::Domain(DomainError::TokenRevoked))
    ));

    // The new value still works
    harness
        .auth()
        .refresh(&second.refresh_token)
        .await
        .expect("rotated token refreshes");
}

#[tokio::test]
async fn test_rotation_preserves_device_metadata() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let mut ctx = device(Platform::Ios);
    ctx.device_info = Some("iPhone 15".to_string());
    let login = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), ctx)
        .await
        .unwrap();

    harness.auth().refresh(&login.refresh_token).await.unwrap();

    let sessions = harness.auth().list_sessions(user.id).await.unwrap();
    assert_eq!(sessions.len(), 1, "old session revoked, one usable remains");
    assert_eq!(sessions[0].platform, Platform::Ios);
    assert_eq!(sessions[0].device_info.as_deref(), Some("iPhone 15"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rotation_has_single_winner() {
    let harness = TestHarness::new();
    let email = unique_email();
    harness.create_user(&email, TEST_PASSWORD).await;

    let login = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ctx = harness.ctx.clone();
        let token = login.refresh_token.clone();
        handles.push(tokio::spawn(async move {
            SessionService::new(&ctx).rotate(&token).await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(_) => winners += 1,
            Err(ServiceError::Domain(
                DomainError::TokenRevoked | DomainError::Conflict(_),
            )) => losers += 1,
            Err(e) => panic!("unexpected rotation error: {e}"),
        }
    }

    assert_eq!(winners, 1, "exactly one rotation wins");
    assert_eq!(losers, 7);
}

#[tokio::test]
async fn test_logout_revokes_single_session() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let a = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .unwrap();
    let b = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Ios))
        .await
        .unwrap();

    harness.auth().logout(&a.refresh_token).await.unwrap();
    // Idempotent
    harness.auth().logout(&a.refresh_token).await.unwrap();

    assert!(matches!(
        harness.auth().refresh(&a.refresh_token).await,
        Err(ServiceError::Domain(DomainError::TokenRevoked))
    ));
    harness.auth().refresh(&b.refresh_token).await.unwrap();

    let sessions = harness.auth().list_sessions(user.id).await.unwrap();
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_logout_all_revokes_everything_and_clears_vault() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let mut tokens = Vec::new();
    for platform in [Platform::Web, Platform::Ios, Platform::Android] {
        let response = harness
            .auth()
            .login(email_login(&email, TEST_PASSWORD), device(platform))
            .await
            .unwrap();
        tokens.push(response.refresh_token);
    }

    let revoked = harness.auth().logout_all(user.id).await.unwrap();
    assert_eq!(revoked, 3);

    for token in &tokens {
        assert!(matches!(
            harness.auth().refresh(token).await,
            Err(ServiceError::Domain(DomainError::TokenRevoked))
        ));
    }

    assert_eq!(harness.vault.cleared_count(user.id), 1);
    assert!(harness.auth().list_sessions(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_refresh_token_rejected() {
    let harness = TestHarness::new();
    let email = unique_email();
    harness.create_user(&email, TEST_PASSWORD).await;

    let login = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .unwrap();

    harness.clock.advance(Duration::days(30) + Duration::seconds(1));

    assert!(matches!(
        harness.auth().refresh(&login.refresh_token).await,
        Err(ServiceError::Domain(DomainError::TokenExpired))
    ));
}

#[tokio::test]
async fn test_heartbeat_on_unknown_token_is_non_fatal() {
    let harness = TestHarness::new();
    let touched = harness
        .auth()
        .heartbeat("no-such-token")
        .await
        .expect("missing token is not an error");
    assert!(!touched);
}

#[tokio::test]
async fn test_activity_classification_timeline() {
    // Issue at t=0 (ios), touch at t=2min: Active at t=3min, Inactive at
    // t=10min with no further activity
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let login = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Ios))
        .await
        .unwrap();

    harness.clock.advance(Duration::minutes(2));
    assert!(harness.auth().heartbeat(&login.refresh_token).await.unwrap());

    harness.clock.advance(Duration::minutes(1));
    let sessions = harness.auth().list_sessions(user.id).await.unwrap();
    assert_eq!(sessions[0].state, SessionState::Active);

    harness.clock.advance(Duration::minutes(7));
    let sessions = harness.auth().list_sessions(user.id).await.unwrap();
    assert_eq!(sessions[0].state, SessionState::Inactive);
}

#[tokio::test]
async fn test_stats_invariants() {
    let harness = TestHarness::new();

    // Three users across platforms; one session goes idle, one is revoked
    let mut refresh_tokens = Vec::new();
    for (platform, n) in [(Platform::Web, 2), (Platform::Ios, 1), (Platform::Android, 1)] {
        for _ in 0..n {
            let email = unique_email();
            harness.create_user(&email, TEST_PASSWORD).await;
            let response = harness
                .auth()
                .login(email_login(&email, TEST_PASSWORD), device(platform))
                .await
                .unwrap();
            refresh_tokens.push(response.refresh_token);
        }
    }

    // Everything fresh: all active
    let stats = harness.stats().current().await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.active, 4);
    assert_eq!(stats.inactive, 0);
    assert_eq!(stats.by_platform.web, 2);
    assert_eq!(stats.by_platform.ios, 1);
    assert_eq!(stats.by_platform.android, 1);

    // Let everything go idle, then touch one session
    harness.clock.advance(Duration::minutes(10));
    harness
        .auth()
        .heartbeat(&refresh_tokens[0])
        .await
        .unwrap();

    let stats = harness.stats().current().await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.inactive, 3);
    assert_eq!(stats.total, stats.active + stats.inactive);

    // Revoked sessions leave every count
    harness.auth().logout(&refresh_tokens[1]).await.unwrap();
    let stats = harness.stats().current().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.total, stats.active + stats.inactive);

    let platform_sum = stats.by_platform.web + stats.by_platform.ios + stats.by_platform.android;
    assert!(platform_sum <= stats.total);
}

#[tokio::test]
async fn test_retention_sweep_removes_dead_rows() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    // One session revoked now, one left to expire naturally
    let a = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .unwrap();
    harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Ios))
        .await
        .unwrap();
    harness.auth().logout(&a.refresh_token).await.unwrap();

    // Plus an outstanding OTP and reset token
    harness
        .otp()
        .request_otp(user.id, auth_core::OtpPurpose::EmailVerification)
        .await
        .unwrap();
    harness.password_reset().request_reset(&email).await.unwrap();

    // Within the retention window nothing is deleted
    let report = harness.sweeper().run_once().await.unwrap();
    assert_eq!(report.total(), 0);

    // Well past expiry plus retention, everything is swept
    harness.clock.advance(Duration::days(40));
    let report = harness.sweeper().run_once().await.unwrap();
    assert_eq!(report.refresh_tokens, 2);
    assert_eq!(report.otps, 1);
    assert_eq!(report.reset_tokens, 1);
    assert_eq!(harness.tokens.row_count(), 0);
}
