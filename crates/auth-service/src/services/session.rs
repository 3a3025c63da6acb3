//! Session service - the refresh-token store
//!
//! Owns issuance, rotation, revocation, activity stamping, and per-user
//! session listing. All mutations go through the repository's conditional
//! updates; this service never does read-then-write on token state.

use auth_core::{generate_token_value, RefreshToken, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::DeviceContext;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Attempts at minting a unique token value before giving up
const ISSUE_ATTEMPTS: u32 = 3;

/// Refresh-token session store
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    /// Create a new SessionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn build_row(&self, user_id: Snowflake, device: &DeviceContext) -> RefreshToken {
        let now = self.ctx.now();
        let mut row = RefreshToken::new(
            self.ctx.generate_id(),
            user_id,
            generate_token_value(),
            device.platform,
            now,
            self.ctx.policy().refresh_ttl,
        );
        if let Some(info) = &device.device_info {
            row = row.with_device_info(info.clone());
        }
        if let Some(ip) = &device.ip_address {
            row = row.with_ip_address(ip.clone());
        }
        row
    }

    /// Issue a new session row for a fresh login
    ///
    /// A token-value collision is retryable, not fatal: the row is rebuilt
    /// with a fresh value up to a small bound.
    #[instrument(skip(self, device), fields(user_id = %user_id))]
    pub async fn issue(
        &self,
        user_id: Snowflake,
        device: &DeviceContext,
    ) -> ServiceResult<RefreshToken> {
        let mut last_err = None;

        for _ in 0..ISSUE_ATTEMPTS {
            let row = self.build_row(user_id, device);
            match self.ctx.refresh_token_repo().insert(&row).await {
                Ok(()) => {
                    info!(user_id = %user_id, platform = %row.platform, "Issued refresh token");
                    return Ok(row);
                }
                Err(e) if e.is_retryable() => {
                    warn!(user_id = %user_id, "Refresh token value collision, retrying");
                    last_err = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.map_or_else(
            || ServiceError::internal("token issuance failed"),
            ServiceError::from,
        ))
    }

    /// Rotate a refresh token: revoke the old row, mint a replacement
    ///
    /// Metadata (platform, device, IP) carries over from the old row. The
    /// repository's conditional update decides the winner under concurrent
    /// duplicate rotation; losers surface `TokenRevoked`.
    #[instrument(skip(self, old_token))]
    pub async fn rotate(&self, old_token: &str) -> ServiceResult<RefreshToken> {
        let now = self.ctx.now();

        // Pre-read only supplies replacement metadata; the rotate call below
        // re-checks usability atomically
        let old = self
            .ctx
            .refresh_token_repo()
            .find_by_token(old_token)
            .await?
            .ok_or(ServiceError::Domain(
                auth_core::DomainError::TokenNotFound,
            ))?;

        let mut last_err = None;
        for _ in 0..ISSUE_ATTEMPTS {
            let mut replacement = RefreshToken::new(
                self.ctx.generate_id(),
                old.user_id,
                generate_token_value(),
                old.platform,
                now,
                self.ctx.policy().refresh_ttl,
            );
            replacement.device_info = old.device_info.clone();
            replacement.ip_address = old.ip_address.clone();

            match self
                .ctx
                .refresh_token_repo()
                .rotate(old_token, &replacement, now)
                .await
            {
                Ok(()) => {
                    info!(user_id = %old.user_id, "Rotated refresh token");
                    return Ok(replacement);
                }
                Err(e) if e.is_retryable() => {
                    warn!(user_id = %old.user_id, "Replacement token collision, retrying");
                    last_err = Some(e);
                }
                Err(e) => {
                    warn!(user_id = %old.user_id, error = %e, "Refresh token rotation refused");
                    return Err(e.into());
                }
            }
        }

        Err(last_err.map_or_else(
            || ServiceError::internal("token rotation failed"),
            ServiceError::from,
        ))
    }

    /// Revoke a single session; idempotent
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> ServiceResult<()> {
        self.ctx
            .refresh_token_repo()
            .revoke(token, self.ctx.now())
            .await?;
        Ok(())
    }

    /// Revoke every session of a user; returns the count revoked
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: Snowflake) -> ServiceResult<u64> {
        let count = self
            .ctx
            .refresh_token_repo()
            .revoke_all_for_user(user_id, self.ctx.now())
            .await?;

        info!(user_id = %user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }

    /// Stamp activity on a session
    ///
    /// A missing token is non-fatal here; the caller's own auth check is
    /// what rejects the request.
    #[instrument(skip(self, token))]
    pub async fn touch_activity(&self, token: &str) -> ServiceResult<bool> {
        let touched = self
            .ctx
            .refresh_token_repo()
            .touch_activity(token, self.ctx.now())
            .await?;

        if !touched {
            warn!("Activity stamp on unknown refresh token");
        }
        Ok(touched)
    }

    /// All sessions of a user, newest first
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: Snowflake) -> ServiceResult<Vec<RefreshToken>> {
        Ok(self
            .ctx
            .refresh_token_repo()
            .list_for_user(user_id)
            .await?)
    }
}
