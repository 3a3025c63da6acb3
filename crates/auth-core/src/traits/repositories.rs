//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs and the infrastructure layer
//! provides the implementation. The linearizable operations (token rotation,
//! OTP consumption, reset consumption) are single trait methods so each
//! implementation owns its compare-and-swap; callers never do
//! read-then-write in two steps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Otp, OtpPurpose, PasswordResetToken, RefreshToken, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by full mobile number (country code + national number)
    async fn find_by_mobile(&self, mobile: &str) -> RepoResult<Option<User>>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;

    /// Set the email-verified flag
    async fn mark_email_verified(&self, id: Snowflake) -> RepoResult<()>;

    /// Set the mobile-verified flag
    async fn mark_mobile_verified(&self, id: Snowflake) -> RepoResult<()>;

    /// Soft delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new token row
    ///
    /// A unique-key collision on the token value surfaces as
    /// `DomainError::Conflict` so the caller can retry with a fresh value.
    async fn insert(&self, token: &RefreshToken) -> RepoResult<()>;

    /// Find a token row by its opaque value
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>>;

    /// Atomically revoke the old row and insert its replacement
    ///
    /// The revocation is conditional on the old row still being usable at
    /// `now`; exactly one of any set of concurrent callers wins. Losers see
    /// `TokenRevoked` (or `TokenNotFound`/`TokenExpired` as appropriate).
    /// Both writes commit together or not at all.
    async fn rotate(&self, old_token: &str, replacement: &RefreshToken, now: DateTime<Utc>)
        -> RepoResult<()>;

    /// Revoke a single token; idempotent, unknown values are a no-op
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> RepoResult<()>;

    /// Revoke every non-revoked token of a user; returns the count revoked
    async fn revoke_all_for_user(&self, user_id: Snowflake, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Stamp last activity; returns false when the token row is absent
    /// (non-fatal, the caller will fail auth separately)
    async fn touch_activity(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool>;

    /// All usable rows (statistics snapshot read)
    async fn list_usable(&self, now: DateTime<Utc>) -> RepoResult<Vec<RefreshToken>>;

    /// All rows of a user, usable or not, newest first
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<RefreshToken>>;

    /// Hard-delete rows expired or revoked before `cutoff`; returns count
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// OTP Repository
// ============================================================================

#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert or overwrite the (user, purpose) row
    async fn upsert(&self, otp: &Otp) -> RepoResult<()>;

    /// Find the outstanding row for (user, purpose)
    async fn find(&self, user_id: Snowflake, purpose: OtpPurpose) -> RepoResult<Option<Otp>>;

    /// Atomically verify-and-consume the (user, purpose) row
    ///
    /// One conditional delete is the linearization point: of two concurrent
    /// calls with the correct code, exactly one returns Ok. Failures are
    /// classified as `OtpNotFound`, `OtpExpired`, or `OtpMismatch`.
    async fn consume(
        &self,
        user_id: Snowflake,
        purpose: OtpPurpose,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<()>;

    /// Hard-delete rows expired before `cutoff`; returns count
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Password Reset Repository
// ============================================================================

/// Outcome of a successful reset consumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetConsumption {
    pub user_id: Snowflake,
    /// Refresh tokens revoked by the same transaction
    pub revoked_sessions: u64,
}

#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Insert a new reset row (multiple outstanding rows per user allowed)
    async fn insert(&self, token: &PasswordResetToken) -> RepoResult<()>;

    /// Find a reset row by token hash
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<PasswordResetToken>>;

    /// Atomically consume the token, set the new password hash, and revoke
    /// every refresh token of the owning user
    ///
    /// All three writes are one transaction; they commit together or not at
    /// all. Failures are classified as `ResetNotFound`, `ResetExpired`, or
    /// `ResetAlreadyUsed`.
    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<ResetConsumption>;

    /// Hard-delete rows expired or consumed before `cutoff`; returns count
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}
