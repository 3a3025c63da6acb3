//! Password reset token database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for password_reset_tokens table
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetTokenModel {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetTokenModel {
    /// Check if the token has been consumed
    #[inline]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Check if the token is expired at the given instant
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
