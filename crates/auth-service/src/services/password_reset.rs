//! Password reset service
//!
//! Reset tokens are high-entropy opaque values; only their hash is stored.
//! Consuming one commits the new password hash and the revocation of every
//! session of the user in one transaction.

use auth_core::{generate_token_value, PasswordResetToken, Snowflake};
use auth_common::validate_password_strength;
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Password reset request and consumption flows
pub struct PasswordResetService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PasswordResetService<'a> {
    /// Create a new PasswordResetService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Start a reset for the account behind this email
    ///
    /// Responds identically whether or not the address exists, so the
    /// endpoint cannot be used to enumerate accounts. Multiple outstanding
    /// tokens per user are allowed; each request adds a row.
    #[instrument(skip(self, email))]
    pub async fn request_reset(&self, email: &str) -> ServiceResult<()> {
        let Some(user) = self.ctx.user_repo().find_by_email(email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_token_value();
        let now = self.ctx.now();
        let row = PasswordResetToken::new(
            self.ctx.generate_id(),
            user.id,
            self.ctx.hasher().hash(&token),
            now,
            self.ctx.policy().reset_ttl,
        );

        self.ctx.reset_repo().insert(&row).await?;

        self.ctx
            .otp_sender()
            .deliver_reset_token(&user, &token)
            .await?;

        info!(user_id = %user.id, "Password reset token issued and handed to delivery");
        Ok(())
    }

    /// Consume a reset token and set the new password
    ///
    /// At most one consumption per token; repeats see `ResetAlreadyUsed`.
    /// Success implies every previously issued refresh token of the user is
    /// unusable, then the device biometric vault is cleared.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ServiceResult<()> {
        validate_password_strength(new_password).map_err(ServiceError::from)?;

        let new_hash = self
            .ctx
            .passwords()
            .hash(new_password)
            .map_err(ServiceError::from)?;

        let token_hash = self.ctx.hasher().hash(token);
        let now = self.ctx.now();

        let consumption = match self
            .ctx
            .reset_repo()
            .consume(&token_hash, &new_hash, now)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Password reset consumption failed");
                return Err(e.into());
            }
        };

        info!(
            user_id = %consumption.user_id,
            revoked_sessions = consumption.revoked_sessions,
            "Password reset committed, all sessions revoked"
        );

        // The reset is already durable; a vault failure must not undo it
        if let Err(e) = self
            .ctx
            .biometric_vault()
            .clear_biometric_token(consumption.user_id)
            .await
        {
            warn!(user_id = %consumption.user_id, error = %e, "Biometric vault clear failed");
        }

        Ok(())
    }

    /// The user id behind a valid, still-consumable token, if any
    ///
    /// Read-only preflight for UIs that validate the link before showing the
    /// new-password form; consumption still re-checks atomically.
    #[instrument(skip(self, token))]
    pub async fn peek(&self, token: &str) -> ServiceResult<Option<Snowflake>> {
        let token_hash = self.ctx.hasher().hash(token);
        let now = self.ctx.now();

        Ok(self
            .ctx
            .reset_repo()
            .find_by_hash(&token_hash)
            .await?
            .filter(|row| row.is_consumable(now))
            .map(|row| row.user_id))
    }
}
