//! In-memory repository implementations
//!
//! Each store serializes its mutations behind one mutex, giving the same
//! linearization guarantees the PostgreSQL layer gets from conditional
//! updates: rotation, OTP consumption, and reset consumption each have a
//! single winner under concurrency.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use auth_core::entities::{Otp, OtpPurpose, PasswordResetToken, RefreshToken, User};
use auth_core::error::DomainError;
use auth_core::traits::{
    BiometricTokenVault, OtpRepository, OtpSender, PasswordResetRepository,
    RefreshTokenRepository, RepoResult, ResetConsumption, UserRepository,
};
use auth_core::value_objects::Snowflake;

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
    deleted: bool,
}

/// In-memory UserRepository
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<HashMap<i64, StoredUser>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn update_password_sync(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let stored = rows
            .get_mut(&id.into_inner())
            .filter(|s| !s.deleted)
            .ok_or(DomainError::UserNotFound(id))?;
        stored.password_hash = password_hash.to_string();
        Ok(())
    }

    /// Read the stored password hash directly (test assertions)
    pub fn password_hash_of(&self, id: Snowflake) -> Option<String> {
        self.rows
            .lock()
            .get(&id.into_inner())
            .map(|s| s.password_hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .get(&id.into_inner())
            .filter(|s| !s.deleted)
            .map(|s| s.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|s| !s.deleted && s.user.email.as_deref() == Some(email))
            .map(|s| s.user.clone()))
    }

    async fn find_by_mobile(&self, mobile: &str) -> RepoResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|s| {
                !s.deleted
                    && s.user
                        .mobile
                        .as_ref()
                        .is_some_and(|m| m.full() == mobile)
            })
            .map(|s| s.user.clone()))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if let Some(email) = &user.email {
            if rows
                .values()
                .any(|s| !s.deleted && s.user.email.as_deref() == Some(email))
            {
                return Err(DomainError::EmailAlreadyExists);
            }
        }
        rows.insert(
            user.id.into_inner(),
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
                deleted: false,
            },
        );
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self
            .rows
            .lock()
            .get(&id.into_inner())
            .filter(|s| !s.deleted)
            .map(|s| s.password_hash.clone()))
    }

    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()> {
        self.update_password_sync(id, password_hash)
    }

    async fn mark_email_verified(&self, id: Snowflake) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let stored = rows
            .get_mut(&id.into_inner())
            .filter(|s| !s.deleted)
            .ok_or(DomainError::UserNotFound(id))?;
        stored.user.mark_email_verified();
        Ok(())
    }

    async fn mark_mobile_verified(&self, id: Snowflake) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let stored = rows
            .get_mut(&id.into_inner())
            .filter(|s| !s.deleted)
            .ok_or(DomainError::UserNotFound(id))?;
        stored.user.mark_mobile_verified();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let stored = rows
            .get_mut(&id.into_inner())
            .filter(|s| !s.deleted)
            .ok_or(DomainError::UserNotFound(id))?;
        stored.deleted = true;
        Ok(())
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

/// In-memory RefreshTokenRepository keyed by opaque token value
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    rows: Mutex<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn revoke_all_sync(&self, user_id: Snowflake, now: DateTime<Utc>) -> u64 {
        let mut rows = self.rows.lock();
        let mut count = 0;
        for row in rows.values_mut() {
            if row.user_id == user_id && !row.is_revoked() && !row.is_deleted() {
                row.revoked_at = Some(now);
                count += 1;
            }
        }
        count
    }

    /// Number of rows currently stored (test assertions)
    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(&self, token: &RefreshToken) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if rows.contains_key(&token.token) {
            return Err(DomainError::Conflict(
                "refresh token value collision".to_string(),
            ));
        }
        rows.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        Ok(self
            .rows
            .lock()
            .get(token)
            .filter(|row| !row.is_deleted())
            .cloned())
    }

    async fn rotate(
        &self,
        old_token: &str,
        replacement: &RefreshToken,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut rows = self.rows.lock();

        // Both writes happen under one lock, like one transaction
        if rows.contains_key(&replacement.token) {
            return Err(DomainError::Conflict(
                "refresh token value collision".to_string(),
            ));
        }

        let old = rows
            .get_mut(old_token)
            .filter(|row| !row.is_deleted())
            .ok_or(DomainError::TokenNotFound)?;

        if old.is_revoked() || !old.active {
            return Err(DomainError::TokenRevoked);
        }
        if old.is_expired(now) {
            return Err(DomainError::TokenExpired);
        }

        old.revoked_at = Some(now);
        rows.insert(replacement.token.clone(), replacement.clone());
        Ok(())
    }

    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if let Some(row) = rows.get_mut(token) {
            if !row.is_revoked() && !row.is_deleted() {
                row.revoked_at = Some(now);
            }
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Snowflake, now: DateTime<Utc>) -> RepoResult<u64> {
        Ok(self.revoke_all_sync(user_id, now))
    }

    async fn touch_activity(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        match rows.get_mut(token).filter(|row| !row.is_deleted()) {
            Some(row) => {
                row.last_activity_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_usable(&self, now: DateTime<Utc>) -> RepoResult<Vec<RefreshToken>> {
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|row| row.is_usable(now))
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<RefreshToken>> {
        let mut rows: Vec<RefreshToken> = self
            .rows
            .lock()
            .values()
            .filter(|row| row.user_id == user_id && !row.is_deleted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, row| {
            let dead = row.expires_at < cutoff
                || row.revoked_at.is_some_and(|at| at < cutoff);
            !dead
        });
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// OTPs
// ============================================================================

/// In-memory OtpRepository keyed by (user, purpose)
#[derive(Default)]
pub struct InMemoryOtpRepository {
    rows: Mutex<HashMap<(i64, OtpPurpose), Otp>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn upsert(&self, otp: &Otp) -> RepoResult<()> {
        self.rows
            .lock()
            .insert((otp.user_id.into_inner(), otp.purpose), otp.clone());
        Ok(())
    }

    async fn find(&self, user_id: Snowflake, purpose: OtpPurpose) -> RepoResult<Option<Otp>> {
        Ok(self
            .rows
            .lock()
            .get(&(user_id.into_inner(), purpose))
            .cloned())
    }

    async fn consume(
        &self,
        user_id: Snowflake,
        purpose: OtpPurpose,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        let key = (user_id.into_inner(), purpose);

        // Check-and-remove under one lock: one winner per code
        let row = rows.get(&key).ok_or(DomainError::OtpNotFound)?;
        if row.is_expired(now) {
            return Err(DomainError::OtpExpired);
        }
        if row.code_hash != code_hash {
            return Err(DomainError::OtpMismatch);
        }

        rows.remove(&key);
        Ok(())
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, row| row.expires_at >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Password reset tokens
// ============================================================================

/// In-memory PasswordResetRepository
///
/// Holds references to the user and refresh-token stores so consumption can
/// apply its cross-entity side effects the way the SQL transaction does.
pub struct InMemoryPasswordResetRepository {
    rows: Mutex<HashMap<String, PasswordResetToken>>,
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<InMemoryRefreshTokenRepository>,
}

impl InMemoryPasswordResetRepository {
    pub fn new(
        users: Arc<InMemoryUserRepository>,
        tokens: Arc<InMemoryRefreshTokenRepository>,
    ) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            users,
            tokens,
        }
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryPasswordResetRepository {
    async fn insert(&self, token: &PasswordResetToken) -> RepoResult<()> {
        let mut rows = self.rows.lock();
        if rows.contains_key(&token.token_hash) {
            return Err(DomainError::Conflict(
                "reset token hash collision".to_string(),
            ));
        }
        rows.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<PasswordResetToken>> {
        Ok(self.rows.lock().get(token_hash).cloned())
    }

    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<ResetConsumption> {
        let user_id = {
            let mut rows = self.rows.lock();
            let row = rows.get_mut(token_hash).ok_or(DomainError::ResetNotFound)?;

            if row.is_used() {
                return Err(DomainError::ResetAlreadyUsed);
            }
            if row.is_expired(now) {
                return Err(DomainError::ResetExpired);
            }

            row.used_at = Some(now);
            row.user_id
        };

        // The used_at flip above already picked the single winner; apply the
        // password update and mass revocation, undoing the flip if the user
        // row is gone (mirrors the SQL rollback)
        if let Err(e) = self.users.update_password_sync(user_id, new_password_hash) {
            if let Some(row) = self.rows.lock().get_mut(token_hash) {
                row.used_at = None;
            }
            return Err(e);
        }

        let revoked_sessions = self.tokens.revoke_all_sync(user_id, now);

        Ok(ResetConsumption {
            user_id,
            revoked_sessions,
        })
    }

    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|_, row| {
            let dead =
                row.expires_at < cutoff || row.used_at.is_some_and(|at| at < cutoff);
            !dead
        });
        Ok((before - rows.len()) as u64)
    }
}

// ============================================================================
// Collaborator doubles
// ============================================================================

#[derive(Debug, Clone)]
pub struct DeliveredCode {
    pub user_id: Snowflake,
    pub purpose: OtpPurpose,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct DeliveredReset {
    pub user_id: Snowflake,
    pub token: String,
}

/// Recording OtpSender: captures every plaintext handed over for delivery
#[derive(Default)]
pub struct RecordingOtpSender {
    codes: Mutex<Vec<DeliveredCode>>,
    resets: Mutex<Vec<DeliveredReset>>,
}

impl RecordingOtpSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently delivered code for (user, purpose)
    pub fn last_code(&self, user_id: Snowflake, purpose: OtpPurpose) -> Option<String> {
        self.codes
            .lock()
            .iter()
            .rev()
            .find(|d| d.user_id == user_id && d.purpose == purpose)
            .map(|d| d.code.clone())
    }

    /// The most recently delivered reset token for a user
    pub fn last_reset_token(&self, user_id: Snowflake) -> Option<String> {
        self.resets
            .lock()
            .iter()
            .rev()
            .find(|d| d.user_id == user_id)
            .map(|d| d.token.clone())
    }

    pub fn code_count(&self) -> usize {
        self.codes.lock().len()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.lock().len()
    }
}

#[async_trait]
impl OtpSender for RecordingOtpSender {
    async fn deliver_code(
        &self,
        user: &User,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), DomainError> {
        self.codes.lock().push(DeliveredCode {
            user_id: user.id,
            purpose,
            code: code.to_string(),
        });
        Ok(())
    }

    async fn deliver_reset_token(&self, user: &User, token: &str) -> Result<(), DomainError> {
        self.resets.lock().push(DeliveredReset {
            user_id: user.id,
            token: token.to_string(),
        });
        Ok(())
    }
}

/// Recording BiometricTokenVault: captures clear calls per user
#[derive(Default)]
pub struct RecordingBiometricVault {
    cleared: Mutex<Vec<Snowflake>>,
}

impl RecordingBiometricVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clear calls for a user
    pub fn cleared_count(&self, user_id: Snowflake) -> usize {
        self.cleared.lock().iter().filter(|id| **id == user_id).count()
    }
}

#[async_trait]
impl BiometricTokenVault for RecordingBiometricVault {
    async fn clear_biometric_token(&self, user_id: Snowflake) -> Result<(), DomainError> {
        self.cleared.lock().push(user_id);
        Ok(())
    }
}
