//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Refresh token not found")]
    TokenNotFound,

    #[error("No outstanding code for this purpose")]
    OtpNotFound,

    #[error("Reset token not found")]
    ResetNotFound,

    // =========================================================================
    // Expiry Errors
    // =========================================================================
    #[error("Refresh token expired")]
    TokenExpired,

    #[error("Code expired")]
    OtpExpired,

    #[error("Reset token expired")]
    ResetExpired,

    // =========================================================================
    // Consumed / One-Shot Errors
    // =========================================================================
    #[error("Refresh token revoked")]
    TokenRevoked,

    #[error("Reset token already used")]
    ResetAlreadyUsed,

    // =========================================================================
    // Mismatch / Validation Errors
    // =========================================================================
    #[error("Code does not match")]
    OtpMismatch,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Mobile already in use")]
    MobileAlreadyExists,

    #[error("Concurrent mutation lost the race: {0}")]
    Conflict(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::TokenNotFound => "UNKNOWN_TOKEN",
            Self::OtpNotFound => "UNKNOWN_CODE",
            Self::ResetNotFound => "UNKNOWN_RESET_TOKEN",

            // Expiry
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::OtpExpired => "CODE_EXPIRED",
            Self::ResetExpired => "RESET_TOKEN_EXPIRED",

            // Consumed
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::ResetAlreadyUsed => "RESET_TOKEN_USED",

            // Mismatch / Validation
            Self::OtpMismatch => "CODE_MISMATCH",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword(_) => "WEAK_PASSWORD",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::MobileAlreadyExists => "MOBILE_ALREADY_EXISTS",
            Self::Conflict(_) => "CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::TokenNotFound | Self::OtpNotFound | Self::ResetNotFound
        )
    }

    /// Check if this is an expiry error
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::OtpExpired | Self::ResetExpired)
    }

    /// Check if this is a consumed one-shot credential error
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::TokenRevoked | Self::ResetAlreadyUsed)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::InvalidEmail | Self::WeakPassword(_) | Self::OtpMismatch
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists | Self::MobileAlreadyExists | Self::Conflict(_)
        )
    }

    /// Errors a caller may resolve by retrying with fresh state
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
