//! OTP service
//!
//! Generates, stores, and verifies short-lived numeric codes per
//! (user, purpose). Plaintext codes leave through the delivery collaborator
//! only; the table holds the one-way hash.

use auth_core::{generate_otp_code, Otp, OtpPurpose, Snowflake, User};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// OTP request and verification flows
pub struct OtpService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> OtpService<'a> {
    /// Create a new OtpService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    /// Generate and deliver a fresh code for (user, purpose)
    ///
    /// Any prior outstanding code for the same purpose is invalidated by the
    /// upsert before the new one is delivered.
    #[instrument(skip(self), fields(user_id = %user_id, purpose = %purpose))]
    pub async fn request_otp(&self, user_id: Snowflake, purpose: OtpPurpose) -> ServiceResult<()> {
        let user = self.load_user(user_id).await?;

        let code = generate_otp_code();
        let now = self.ctx.now();
        let otp = Otp::new(
            self.ctx.generate_id(),
            user_id,
            purpose,
            self.ctx.hasher().hash(&code),
            now,
            self.ctx.policy().otp_ttl,
        );

        self.ctx.otp_repo().upsert(&otp).await?;

        // Plaintext is handed to the delivery collaborator and dropped
        self.ctx
            .otp_sender()
            .deliver_code(&user, purpose, &code)
            .await?;

        info!(user_id = %user_id, purpose = %purpose, "OTP issued and handed to delivery");
        Ok(())
    }

    /// Verify and consume a candidate code
    ///
    /// The repository consume is a single atomic read-check-consume, so a
    /// code verifies at most once per (user, purpose) even under concurrent
    /// attempts. Success flips the matching verification flag on the user.
    #[instrument(skip(self, candidate), fields(user_id = %user_id, purpose = %purpose))]
    pub async fn verify_otp(
        &self,
        user_id: Snowflake,
        purpose: OtpPurpose,
        candidate: &str,
    ) -> ServiceResult<()> {
        let candidate_hash = self.ctx.hasher().hash(candidate);
        let now = self.ctx.now();

        if let Err(e) = self
            .ctx
            .otp_repo()
            .consume(user_id, purpose, &candidate_hash, now)
            .await
        {
            // Logs keep the exact failure; clients get the collapsed message
            warn!(user_id = %user_id, purpose = %purpose, error = %e, "OTP verification failed");
            return Err(e.into());
        }

        match purpose {
            OtpPurpose::EmailVerification => {
                self.ctx.user_repo().mark_email_verified(user_id).await?;
            }
            // A WhatsApp code proves possession of the same number
            OtpPurpose::MobileVerification | OtpPurpose::WhatsappVerification => {
                self.ctx.user_repo().mark_mobile_verified(user_id).await?;
            }
            OtpPurpose::PasswordReset | OtpPurpose::Other => {}
        }

        info!(user_id = %user_id, purpose = %purpose, "OTP verified");
        Ok(())
    }
}
