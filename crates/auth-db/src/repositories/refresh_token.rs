//! PostgreSQL implementation of RefreshTokenRepository
//!
//! Rotation and revocation are conditional updates; the affected-row count
//! is the linearization point between concurrent callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use auth_core::entities::RefreshToken;
use auth_core::error::DomainError;
use auth_core::traits::{RefreshTokenRepository, RepoResult};
use auth_core::value_objects::Snowflake;

use crate::models::RefreshTokenModel;

use super::error::{map_db_error, map_unique_violation};

const TOKEN_COLUMNS: &str = "id, user_id, token, expires_at, revoked_at, active, platform, \
     last_activity_at, device_info, ip_address, created_at, deleted_at";

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why the conditional revoke missed, for the losing caller
    async fn classify_unusable(&self, token: &str, now: DateTime<Utc>) -> DomainError {
        match self.find_by_token(token).await {
            Ok(None) => DomainError::TokenNotFound,
            Ok(Some(row)) => {
                if row.is_revoked() || !row.active {
                    DomainError::TokenRevoked
                } else if row.is_expired(now) {
                    DomainError::TokenExpired
                } else {
                    // Row became usable again between the update and this
                    // read; treat as a lost race
                    DomainError::Conflict("refresh token state changed".to_string())
                }
            }
            Err(e) => e,
        }
    }
}

fn bind_insert<'q>(
    query: &'q str,
    token: &'q RefreshToken,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(query)
        .bind(token.id.into_inner())
        .bind(token.user_id.into_inner())
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .bind(token.active)
        .bind(token.platform.as_str())
        .bind(token.last_activity_at)
        .bind(&token.device_info)
        .bind(&token.ip_address)
        .bind(token.created_at)
}

const INSERT_SQL: &str = r"
    INSERT INTO refresh_tokens (id, user_id, token, expires_at, revoked_at, active, platform,
                                last_activity_at, device_info, ip_address, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ";

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn insert(&self, token: &RefreshToken) -> RepoResult<()> {
        bind_insert(INSERT_SQL, token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    DomainError::Conflict("refresh token value collision".to_string())
                })
            })?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1 AND deleted_at IS NULL"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self, old_token, replacement), fields(user_id = %replacement.user_id))]
    async fn rotate(
        &self,
        old_token: &str,
        replacement: &RefreshToken,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Conditional revoke: exactly one concurrent rotation wins
        let revoked = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE token = $1 AND revoked_at IS NULL AND deleted_at IS NULL
              AND active AND expires_at > $2
            ",
        )
        .bind(old_token)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(self.classify_unusable(old_token, now).await);
        }

        bind_insert(INSERT_SQL, replacement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || {
                    DomainError::Conflict("refresh token value collision".to_string())
                })
            })?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> RepoResult<()> {
        // Idempotent: already-revoked or unknown values are a no-op
        sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE token = $1 AND revoked_at IS NULL AND deleted_at IS NULL
            ",
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: Snowflake, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE user_id = $1 AND revoked_at IS NULL AND deleted_at IS NULL
            ",
        )
        .bind(user_id.into_inner())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, token))]
    async fn touch_activity(&self, token: &str, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET last_activity_at = $2
            WHERE token = $1 AND deleted_at IS NULL
            ",
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_usable(&self, now: DateTime<Utc>) -> RepoResult<Vec<RefreshToken>> {
        let rows = sqlx::query_as::<_, RefreshTokenModel>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens \
             WHERE revoked_at IS NULL AND deleted_at IS NULL AND active AND expires_at > $1"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<RefreshToken>> {
        let rows = sqlx::query_as::<_, RefreshTokenModel>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens \
             WHERE user_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM refresh_tokens
            WHERE expires_at < $1
               OR (revoked_at IS NOT NULL AND revoked_at < $1)
            ",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
