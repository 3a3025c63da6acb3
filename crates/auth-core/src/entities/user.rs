//! User entity - an account on the tutoring platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Tutor,
    Student,
    Admin,
}

impl UserRole {
    /// Canonical database tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutor => "TUTOR",
            Self::Student => "STUDENT",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TUTOR" => Ok(Self::Tutor),
            "STUDENT" => Ok(Self::Student),
            "ADMIN" => Ok(Self::Admin),
            other => Err(DomainError::ValidationError(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Mobile number split into country code and national number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mobile {
    pub country_code: String,
    pub number: String,
}

impl Mobile {
    pub fn new(country_code: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            number: number.into(),
        }
    }

    /// E.164-style rendering used for delivery and lookups
    #[must_use]
    pub fn full(&self) -> String {
        format!("{}{}", self.country_code, self.number)
    }
}

impl std::fmt::Display for Mobile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.country_code, self.number)
    }
}

/// User entity
///
/// The password hash is deliberately not a field here; it lives only in the
/// users table and is read through `UserRepository::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: Option<String>,
    pub mobile: Option<Mobile>,
    pub role: UserRole,
    pub email_verified: bool,
    pub mobile_verified: bool,
    pub signup_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User
    ///
    /// # Errors
    /// Returns `ValidationError` when neither email nor mobile is provided.
    pub fn new(
        id: Snowflake,
        email: Option<String>,
        mobile: Option<Mobile>,
        role: UserRole,
    ) -> Result<Self, DomainError> {
        if email.is_none() && mobile.is_none() {
            return Err(DomainError::ValidationError(
                "user requires at least one of email or mobile".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            email,
            mobile,
            role,
            email_verified: false,
            mobile_verified: false,
            signup_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether any contact point has been verified
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.email_verified || self.mobile_verified
    }

    #[inline]
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Mark the email contact as verified
    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }

    /// Mark the mobile contact as verified
    pub fn mark_mobile_verified(&mut self) {
        self.mobile_verified = true;
        self.updated_at = Utc::now();
    }

    /// Mark signup as completed (password set, contact verified)
    pub fn complete_signup(&mut self) {
        self.signup_completed = true;
        self.updated_at = Utc::now();
    }
}
