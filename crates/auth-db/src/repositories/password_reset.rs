//! PostgreSQL implementation of PasswordResetRepository
//!
//! Consuming a reset token, writing the new password hash, and revoking
//! every session of the user commit in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use auth_core::entities::PasswordResetToken;
use auth_core::error::DomainError;
use auth_core::traits::{PasswordResetRepository, RepoResult, ResetConsumption};
use auth_core::value_objects::Snowflake;

use crate::models::PasswordResetTokenModel;

use super::error::{map_db_error, map_unique_violation};

const RESET_COLUMNS: &str = "id, user_id, token_hash, expires_at, used_at, created_at";

/// PostgreSQL implementation of PasswordResetRepository
#[derive(Clone)]
pub struct PgPasswordResetRepository {
    pool: PgPool,
}

impl PgPasswordResetRepository {
    /// Create a new PgPasswordResetRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why the conditional update missed, for the losing caller
    async fn classify_unconsumable(&self, token_hash: &str, now: DateTime<Utc>) -> DomainError {
        match self.find_by_hash(token_hash).await {
            Ok(None) => DomainError::ResetNotFound,
            Ok(Some(row)) => {
                if row.is_used() {
                    DomainError::ResetAlreadyUsed
                } else if row.is_expired(now) {
                    DomainError::ResetExpired
                } else {
                    DomainError::Conflict("reset token state changed".to_string())
                }
            }
            Err(e) => e,
        }
    }
}

#[async_trait]
impl PasswordResetRepository for PgPasswordResetRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn insert(&self, token: &PasswordResetToken) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(token.id.into_inner())
        .bind(token.user_id.into_inner())
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.used_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict("reset token hash collision".to_string())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, token_hash))]
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<PasswordResetToken>> {
        let result = sqlx::query_as::<_, PasswordResetTokenModel>(&format!(
            "SELECT {RESET_COLUMNS} FROM password_reset_tokens WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PasswordResetToken::from))
    }

    #[instrument(skip(self, token_hash, new_password_hash))]
    async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<ResetConsumption> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // CAS on used_at: exactly one concurrent consumption wins
        let consumed = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE password_reset_tokens
            SET used_at = $2
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at >= $2
            RETURNING user_id
            ",
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(user_id) = consumed else {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(self.classify_unconsumable(token_hash, now).await);
        };

        // Password update and mass revocation ride the same transaction as
        // the consumption; a forced logout on every device is part of the
        // reset, not a best-effort follow-up
        let updated = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(user_id)
        .bind(new_password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(DomainError::UserNotFound(Snowflake::new(user_id)));
        }

        let revoked = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL AND deleted_at IS NULL
            ",
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(ResetConsumption {
            user_id: Snowflake::new(user_id),
            revoked_sessions: revoked.rows_affected(),
        })
    }

    #[instrument(skip(self))]
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM password_reset_tokens
            WHERE expires_at < $1
               OR (used_at IS NOT NULL AND used_at < $1)
            ",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
