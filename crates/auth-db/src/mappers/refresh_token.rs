//! Refresh token model -> entity mapper

use auth_core::entities::RefreshToken;
use auth_core::value_objects::{Platform, Snowflake};

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            token: model.token,
            expires_at: model.expires_at,
            revoked_at: model.revoked_at,
            active: model.active,
            // Legacy platform tags migrate through parse_tag
            platform: Platform::parse_tag(&model.platform),
            last_activity_at: model.last_activity_at,
            device_info: model.device_info,
            ip_address: model.ip_address,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        }
    }
}
