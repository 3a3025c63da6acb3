//! PostgreSQL implementation of OtpRepository
//!
//! Consumption is a single conditional DELETE so verify-and-consume is one
//! linearizable step per (user, purpose).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use auth_core::entities::{Otp, OtpPurpose};
use auth_core::error::DomainError;
use auth_core::traits::{OtpRepository, RepoResult};
use auth_core::value_objects::Snowflake;

use crate::models::OtpModel;

use super::error::map_db_error;

const OTP_COLUMNS: &str = "id, user_id, purpose, code_hash, expires_at, created_at";

/// PostgreSQL implementation of OtpRepository
#[derive(Clone)]
pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    /// Create a new PgOtpRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    #[instrument(skip(self, otp), fields(user_id = %otp.user_id, purpose = %otp.purpose))]
    async fn upsert(&self, otp: &Otp) -> RepoResult<()> {
        // One row per (user, purpose): a re-request overwrites the old code
        sqlx::query(
            r"
            INSERT INTO otps (id, user_id, purpose, code_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, purpose)
            DO UPDATE SET code_hash = EXCLUDED.code_hash,
                          expires_at = EXCLUDED.expires_at,
                          created_at = EXCLUDED.created_at
            ",
        )
        .bind(otp.id.into_inner())
        .bind(otp.user_id.into_inner())
        .bind(otp.purpose.as_str())
        .bind(&otp.code_hash)
        .bind(otp.expires_at)
        .bind(otp.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&self, user_id: Snowflake, purpose: OtpPurpose) -> RepoResult<Option<Otp>> {
        let result = sqlx::query_as::<_, OtpModel>(&format!(
            "SELECT {OTP_COLUMNS} FROM otps WHERE user_id = $1 AND purpose = $2"
        ))
        .bind(user_id.into_inner())
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Otp::try_from).transpose()
    }

    #[instrument(skip(self, code_hash))]
    async fn consume(
        &self,
        user_id: Snowflake,
        purpose: OtpPurpose,
        code_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<()> {
        // The conditional delete is the linearization point: of two
        // concurrent calls with the correct code, exactly one removes the row
        let result = sqlx::query(
            r"
            DELETE FROM otps
            WHERE user_id = $1 AND purpose = $2 AND code_hash = $3 AND expires_at >= $4
            ",
        )
        .bind(user_id.into_inner())
        .bind(purpose.as_str())
        .bind(code_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Losing caller: classify for internal logs. The row may have been
        // consumed meanwhile, which reads as NotFound.
        match self.find(user_id, purpose).await? {
            None => Err(DomainError::OtpNotFound),
            Some(row) if row.is_expired(now) => Err(DomainError::OtpExpired),
            Some(_) => Err(DomainError::OtpMismatch),
        }
    }

    #[instrument(skip(self))]
    async fn delete_stale(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM otps WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
