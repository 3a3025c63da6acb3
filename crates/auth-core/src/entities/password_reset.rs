//! Password reset token entity - single-use credential for password change

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Password reset token entity
///
/// `used_at` is monotonic None -> Some; once set the token fails
/// verification even inside its validity window. A user may hold several
/// outstanding rows at once; uniqueness is on the hash alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub id: Snowflake,
    pub user_id: Snowflake,
    /// One-way hash of the reset token, unique across all rows
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        token_hash: String,
        created_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            id,
            user_id,
            token_hash,
            expires_at: created_at + ttl,
            used_at: None,
            created_at,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the token can still be consumed
    #[must_use]
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used() && !self.is_expired(now)
    }
}
