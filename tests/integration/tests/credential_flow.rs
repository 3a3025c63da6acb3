//! OTP and password-reset flow tests
//!
//! One-time codes and reset tokens over the in-memory stores.
//! Run with: cargo test -p integration-tests

use chrono::Duration;

use auth_core::traits::UserRepository;
use auth_core::{DomainError, OtpPurpose, Platform};
use auth_service::services::{OtpService, ServiceError};
use integration_tests::{device, email_login, unique_email, TestHarness, TEST_PASSWORD};

/// A 4-digit code guaranteed to differ from `delivered`
fn wrong_code(delivered: &str) -> &'static str {
    if delivered == "0000" {
        "1111"
    } else {
        "0000"
    }
}

#[tokio::test]
async fn test_otp_request_verify_and_replay() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness
        .otp()
        .request_otp(user.id, OtpPurpose::MobileVerification)
        .await
        .unwrap();

    let code = harness
        .sender
        .last_code(user.id, OtpPurpose::MobileVerification)
        .expect("code was handed to delivery");
    assert_eq!(code.len(), 4);

    // Wrong candidate: mismatch, and the row survives
    let mismatch = harness
        .otp()
        .verify_otp(user.id, OtpPurpose::MobileVerification, wrong_code(&code))
        .await;
    assert!(matches!(
        mismatch,
        Err(ServiceError::Domain(DomainError::OtpMismatch))
    ));

    // Correct candidate: verified, flag set
    harness
        .otp()
        .verify_otp(user.id, OtpPurpose::MobileVerification, &code)
        .await
        .expect("correct code verifies");

    let user = harness
        .users
        .find_by_id(user.id)
        .await
        .unwrap()
        .expect("user exists");
    assert!(user.mobile_verified);

    // Replay: the row is consumed
    let replay = harness
        .otp()
        .verify_otp(user.id, OtpPurpose::MobileVerification, &code)
        .await;
    assert!(matches!(
        replay,
        Err(ServiceError::Domain(DomainError::OtpNotFound))
    ));
}

#[tokio::test]
async fn test_otp_verify_without_request_is_not_found() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    let result = harness
        .otp()
        .verify_otp(user.id, OtpPurpose::EmailVerification, "1234")
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Domain(DomainError::OtpNotFound))
    ));
}

#[tokio::test]
async fn test_otp_expires() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness
        .otp()
        .request_otp(user.id, OtpPurpose::EmailVerification)
        .await
        .unwrap();
    let code = harness
        .sender
        .last_code(user.id, OtpPurpose::EmailVerification)
        .unwrap();

    harness.clock.advance(Duration::minutes(10) + Duration::seconds(1));

    let result = harness
        .otp()
        .verify_otp(user.id, OtpPurpose::EmailVerification, &code)
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Domain(DomainError::OtpExpired))
    ));
}

#[tokio::test]
async fn test_otp_rerequest_invalidates_prior_code() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness
        .otp()
        .request_otp(user.id, OtpPurpose::WhatsappVerification)
        .await
        .unwrap();
    let first = harness
        .sender
        .last_code(user.id, OtpPurpose::WhatsappVerification)
        .unwrap();

    // Second request for the same purpose overwrites the row. The new code
    // may collide with the old one out of 10^4, so re-request until the
    // plaintext actually differs.
    let second = loop {
        harness
            .otp()
            .request_otp(user.id, OtpPurpose::WhatsappVerification)
            .await
            .unwrap();
        let code = harness
            .sender
            .last_code(user.id, OtpPurpose::WhatsappVerification)
            .unwrap();
        if code != first {
            break code;
        }
    };

    let stale = harness
        .otp()
        .verify_otp(user.id, OtpPurpose::WhatsappVerification, &first)
        .await;
    assert!(matches!(
        stale,
        Err(ServiceError::Domain(DomainError::OtpMismatch))
    ));

    harness
        .otp()
        .verify_otp(user.id, OtpPurpose::WhatsappVerification, &second)
        .await
        .expect("fresh code verifies");

    // WhatsApp verification proves possession of the mobile number
    let user = harness.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(user.mobile_verified);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_otp_consumption_has_single_winner() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness
        .otp()
        .request_otp(user.id, OtpPurpose::MobileVerification)
        .await
        .unwrap();
    let code = harness
        .sender
        .last_code(user.id, OtpPurpose::MobileVerification)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ctx = harness.ctx.clone();
        let code = code.clone();
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            OtpService::new(&ctx)
                .verify_otp(user_id, OtpPurpose::MobileVerification, &code)
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.expect("task completes") {
            Ok(()) => winners += 1,
            Err(ServiceError::Domain(DomainError::OtpNotFound)) => losers += 1,
            Err(e) => panic!("unexpected verification error: {e}"),
        }
    }

    assert_eq!(winners, 1, "a code verifies at most once");
    assert_eq!(losers, 7);
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn test_password_reset_flow_revokes_all_sessions() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    // Two live sessions before the reset
    let web = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await
        .unwrap();
    let ios = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Ios))
        .await
        .unwrap();

    harness.password_reset().request_reset(&email).await.unwrap();
    let token = harness
        .sender
        .last_reset_token(user.id)
        .expect("token was handed to delivery");

    // Weak replacement password is rejected before anything is consumed
    let weak = harness
        .password_reset()
        .reset_password(&token, "weak")
        .await;
    assert!(weak.is_err());

    harness
        .password_reset()
        .reset_password(&token, "BrandNewPass42")
        .await
        .expect("reset succeeds");

    // Every pre-reset session is unusable afterward
    for refresh_token in [&web.refresh_token, &ios.refresh_token] {
        assert!(matches!(
            harness.auth().refresh(refresh_token).await,
            Err(ServiceError::Domain(DomainError::TokenRevoked))
        ));
    }
    assert_eq!(harness.vault.cleared_count(user.id), 1);

    // Old password is gone, the new one logs in
    let old = harness
        .auth()
        .login(email_login(&email, TEST_PASSWORD), device(Platform::Web))
        .await;
    assert!(old.is_err());

    harness
        .auth()
        .login(email_login(&email, "BrandNewPass42"), device(Platform::Web))
        .await
        .expect("new password logs in");
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness.password_reset().request_reset(&email).await.unwrap();
    let token = harness.sender.last_reset_token(user.id).unwrap();

    harness
        .password_reset()
        .reset_password(&token, "BrandNewPass42")
        .await
        .unwrap();

    let again = harness
        .password_reset()
        .reset_password(&token, "AnotherPass77")
        .await;
    assert!(matches!(
        again,
        Err(ServiceError::Domain(DomainError::ResetAlreadyUsed))
    ));
}

#[tokio::test]
async fn test_reset_token_expires() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness.password_reset().request_reset(&email).await.unwrap();
    let token = harness.sender.last_reset_token(user.id).unwrap();

    harness.clock.advance(Duration::minutes(60) + Duration::seconds(1));

    let result = harness
        .password_reset()
        .reset_password(&token, "BrandNewPass42")
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Domain(DomainError::ResetExpired))
    ));
}

#[tokio::test]
async fn test_reset_unknown_token_not_found() {
    let harness = TestHarness::new();
    let result = harness
        .password_reset()
        .reset_password("never-issued", "BrandNewPass42")
        .await;
    assert!(matches!(
        result,
        Err(ServiceError::Domain(DomainError::ResetNotFound))
    ));
}

#[tokio::test]
async fn test_reset_request_for_unknown_email_is_silent() {
    let harness = TestHarness::new();

    harness
        .password_reset()
        .request_reset("nobody@example.com")
        .await
        .expect("unknown email is not an error");

    assert_eq!(harness.sender.reset_count(), 0);
}

#[tokio::test]
async fn test_multiple_outstanding_reset_tokens_allowed() {
    let harness = TestHarness::new();
    let email = unique_email();
    let user = harness.create_user(&email, TEST_PASSWORD).await;

    harness.password_reset().request_reset(&email).await.unwrap();
    let first = harness.sender.last_reset_token(user.id).unwrap();
    harness.password_reset().request_reset(&email).await.unwrap();
    let second = harness.sender.last_reset_token(user.id).unwrap();
    assert_ne!(first, second);

    // Both stay valid until one is consumed; the earlier one still works
    assert!(harness.password_reset().peek(&first).await.unwrap().is_some());
    harness
        .password_reset()
        .reset_password(&first, "BrandNewPass42")
        .await
        .unwrap();

    // The second token survives the first consumption
    assert!(harness.password_reset().peek(&second).await.unwrap().is_some());
}
