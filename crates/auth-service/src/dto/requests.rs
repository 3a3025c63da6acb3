//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; those carrying user input
//! implement `Validate`.

use auth_core::{OtpPurpose, Platform};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// Login request: email or full mobile number plus password
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Full mobile number including country code
    #[validate(length(min = 8, max = 16, message = "Invalid mobile number"))]
    pub mobile: Option<String>,

    pub password: String,
}

impl LoginRequest {
    /// Whether any identifier was supplied at all
    #[must_use]
    pub fn has_identifier(&self) -> bool {
        self.email.is_some() || self.mobile.is_some()
    }
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request (revokes one session, or all when no token given)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Client context captured by the transport layer at login
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeviceContext {
    #[serde(default)]
    pub platform: Platform,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
}

// ============================================================================
// OTP Requests
// ============================================================================

/// Request a fresh code for a verification purpose
#[derive(Debug, Clone, Deserialize)]
pub struct RequestOtpRequest {
    pub purpose: OtpPurpose,
}

/// Verify a previously delivered code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    pub purpose: OtpPurpose,

    #[validate(length(equal = 4, message = "Code must be 4 digits"))]
    pub code: String,
}

// ============================================================================
// Password Reset Requests
// ============================================================================

/// Start a password reset for the account behind this email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Complete a password reset with the delivered token
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub new_password: String,
}
