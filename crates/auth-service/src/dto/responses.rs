//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use auth_core::{Platform, RefreshToken, SessionState, User, UserRole};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: CurrentUserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// Authenticated user response
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub mobile_verified: bool,
    pub signup_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            mobile: user.mobile.as_ref().map(|m| m.full()),
            role: user.role,
            email_verified: user.email_verified,
            mobile_verified: user.mobile_verified,
            signup_completed: user.signup_completed,
            created_at: user.created_at,
        }
    }
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

// ============================================================================
// Session Responses
// ============================================================================

/// One device session in the user's session list
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub platform: Platform,
    pub device_info: Option<String>,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
}

impl SessionResponse {
    /// Build from a usable token row, classified at `now`
    pub fn from_token(token: &RefreshToken, now: DateTime<Utc>) -> Self {
        Self {
            id: token.id.to_string(),
            platform: token.platform,
            device_info: token.device_info.clone(),
            last_activity_at: token.last_activity_at,
            created_at: token.created_at,
            state: token.classify(now),
        }
    }
}

// ============================================================================
// Statistics Responses
// ============================================================================

/// Per-platform session counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlatformBreakdown {
    pub web: u64,
    pub ios: u64,
    pub android: u64,
}

/// Session statistics read model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStatsResponse {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub by_platform: PlatformBreakdown,
}
