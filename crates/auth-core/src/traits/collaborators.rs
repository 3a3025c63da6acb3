//! Collaborator boundaries - external systems this core hands secrets to
//!
//! Plaintext codes and reset tokens leave this core only through
//! [`OtpSender`]; they are never transmitted on the core's own channel.

use async_trait::async_trait;

use crate::entities::{OtpPurpose, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Out-of-band delivery of one-time secrets (SMS / email / WhatsApp)
#[async_trait]
pub trait OtpSender: Send + Sync {
    /// Deliver a freshly generated OTP code to the user
    async fn deliver_code(
        &self,
        user: &User,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), DomainError>;

    /// Deliver a password-reset token to the user
    async fn deliver_reset_token(&self, user: &User, token: &str) -> Result<(), DomainError>;
}

/// Device-side vault binding the current refresh token to platform biometrics
///
/// Cleared whenever every session of a user is invalidated (logout-all,
/// password reset) so a stale biometric unlock cannot resurrect a revoked
/// token.
#[async_trait]
pub trait BiometricTokenVault: Send + Sync {
    async fn clear_biometric_token(&self, user_id: Snowflake) -> Result<(), DomainError>;
}

/// No-op sender for compositions where delivery is wired elsewhere
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOtpSender;

#[async_trait]
impl OtpSender for NoopOtpSender {
    async fn deliver_code(
        &self,
        _user: &User,
        _purpose: OtpPurpose,
        _code: &str,
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn deliver_reset_token(&self, _user: &User, _token: &str) -> Result<(), DomainError> {
        Ok(())
    }
}

/// No-op vault for server-side compositions without a device channel
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBiometricVault;

#[async_trait]
impl BiometricTokenVault for NoopBiometricVault {
    async fn clear_biometric_token(&self, _user_id: Snowflake) -> Result<(), DomainError> {
        Ok(())
    }
}
