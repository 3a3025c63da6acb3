//! User model -> entity mapper

use auth_core::entities::{Mobile, User};
use auth_core::error::DomainError;
use auth_core::value_objects::Snowflake;

use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role = model.role.parse()?;
        let mobile = match (model.country_code, model.mobile_number) {
            (Some(country_code), Some(number)) => Some(Mobile::new(country_code, number)),
            _ => None,
        };

        Ok(User {
            id: Snowflake::new(model.id),
            email: model.email,
            mobile,
            role,
            email_verified: model.email_verified,
            mobile_verified: model.mobile_verified,
            signup_completed: model.signup_completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
