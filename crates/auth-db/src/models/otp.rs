//! OTP database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for otps table (unique on user_id + purpose)
#[derive(Debug, Clone, FromRow)]
pub struct OtpModel {
    pub id: i64,
    pub user_id: i64,
    pub purpose: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OtpModel {
    /// Check if the code is expired at the given instant
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
