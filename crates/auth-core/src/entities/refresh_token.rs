//! Refresh token entity - one row per device session

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Platform, Snowflake};

/// Idle window after which a session counts as inactive (5 minutes)
pub const ACTIVITY_WINDOW_SECONDS: i64 = 300;

/// Entropy of a generated token value in bytes
const TOKEN_BYTES: usize = 32;

/// Generate an opaque refresh-token value
///
/// 32 random bytes, URL-safe base64 without padding. Uniqueness is by
/// construction; the store still treats a unique-key collision as retryable.
#[must_use]
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Activity classification of a usable session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Activity within the idle window
    Active,
    /// Logged in but idle past the window
    Inactive,
}

/// Refresh token entity
///
/// Lifecycle: created on login or rotation, `last_activity_at` stamped on
/// each authenticated request or heartbeat, revoked on logout, rotation, or
/// password change. Rows are only physically removed by the retention sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Snowflake,
    pub user_id: Snowflake,
    /// Opaque token value, unique across all rows
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub platform: Platform,
    pub last_activity_at: DateTime<Utc>,
    pub device_info: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    /// Create a fresh token row
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        token: String,
        platform: Platform,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            user_id,
            token,
            expires_at: issued_at + ttl,
            revoked_at: None,
            active: true,
            platform,
            last_activity_at: issued_at,
            device_info: None,
            ip_address: None,
            created_at: issued_at,
            deleted_at: None,
        }
    }

    /// Attach client device info
    #[must_use]
    pub fn with_device_info(mut self, device: impl Into<String>) -> Self {
        self.device_info = Some(device.into());
        self
    }

    /// Attach the issuing IP address
    #[must_use]
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usability predicate: not revoked, not deleted, active, not expired
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_deleted() && self.active && !self.is_expired(now)
    }

    /// Classify a usable session by recency of activity
    #[must_use]
    pub fn classify(&self, now: DateTime<Utc>) -> SessionState {
        if now - self.last_activity_at < Duration::seconds(ACTIVITY_WINDOW_SECONDS) {
            SessionState::Active
        } else {
            SessionState::Inactive
        }
    }
}
