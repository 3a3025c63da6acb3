//! Password reset token model -> entity mapper

use auth_core::entities::PasswordResetToken;
use auth_core::value_objects::Snowflake;

use crate::models::PasswordResetTokenModel;

impl From<PasswordResetTokenModel> for PasswordResetToken {
    fn from(model: PasswordResetTokenModel) -> Self {
        PasswordResetToken {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            token_hash: model.token_hash,
            expires_at: model.expires_at,
            used_at: model.used_at,
            created_at: model.created_at,
        }
    }
}
