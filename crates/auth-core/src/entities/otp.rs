//! OTP entity - short-lived numeric code bound to (user, purpose)

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Generate a 4-digit code, uniform over 0000-9999
#[must_use]
pub fn generate_otp_code() -> String {
    format!("{:04}", rand::thread_rng().gen_range(0..10_000))
}

/// Verification purpose an OTP is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    EmailVerification,
    MobileVerification,
    WhatsappVerification,
    PasswordReset,
    Other,
}

impl OtpPurpose {
    /// Canonical database tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "EMAIL_VERIFICATION",
            Self::MobileVerification => "MOBILE_VERIFICATION",
            Self::WhatsappVerification => "WHATSAPP_VERIFICATION",
            Self::PasswordReset => "PASSWORD_RESET",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OtpPurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "EMAIL_VERIFICATION" => Ok(Self::EmailVerification),
            "MOBILE_VERIFICATION" => Ok(Self::MobileVerification),
            "WHATSAPP_VERIFICATION" => Ok(Self::WhatsappVerification),
            "PASSWORD_RESET" => Ok(Self::PasswordReset),
            "OTHER" => Ok(Self::Other),
            other => Err(DomainError::ValidationError(format!(
                "unknown otp purpose: {other}"
            ))),
        }
    }
}

/// OTP entity
///
/// One row per (user, purpose); requesting a new code for the same purpose
/// overwrites the prior row. Only the one-way hash of the code is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Otp {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub purpose: OtpPurpose,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    pub fn new(
        id: Snowflake,
        user_id: Snowflake,
        purpose: OtpPurpose,
        code_hash: String,
        created_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            id,
            user_id,
            purpose,
            code_hash,
            expires_at: created_at + ttl,
            created_at,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
