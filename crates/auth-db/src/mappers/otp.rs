//! OTP model -> entity mapper

use auth_core::entities::Otp;
use auth_core::error::DomainError;
use auth_core::value_objects::Snowflake;

use crate::models::OtpModel;

impl TryFrom<OtpModel> for Otp {
    type Error = DomainError;

    fn try_from(model: OtpModel) -> Result<Self, Self::Error> {
        Ok(Otp {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            purpose: model.purpose.parse()?,
            code_hash: model.code_hash,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}
