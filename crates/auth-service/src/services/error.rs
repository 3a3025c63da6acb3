//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use auth_common::AppError;
use auth_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (auth, validation, etc.)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// Conflict (concurrent mutation lost the race)
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => AppError::Domain(clone_domain(e)).status_code(),
            Self::App(e) => e.status_code(),
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// DomainError carries strings, so a structural clone keeps status mapping in
// one place without making the enum Clone
fn clone_domain(e: &DomainError) -> DomainError {
    match e {
        DomainError::UserNotFound(id) => DomainError::UserNotFound(*id),
        DomainError::TokenNotFound => DomainError::TokenNotFound,
        DomainError::OtpNotFound => DomainError::OtpNotFound,
        DomainError::ResetNotFound => DomainError::ResetNotFound,
        DomainError::TokenExpired => DomainError::TokenExpired,
        DomainError::OtpExpired => DomainError::OtpExpired,
        DomainError::ResetExpired => DomainError::ResetExpired,
        DomainError::TokenRevoked => DomainError::TokenRevoked,
        DomainError::ResetAlreadyUsed => DomainError::ResetAlreadyUsed,
        DomainError::OtpMismatch => DomainError::OtpMismatch,
        DomainError::ValidationError(m) => DomainError::ValidationError(m.clone()),
        DomainError::InvalidEmail => DomainError::InvalidEmail,
        DomainError::WeakPassword(m) => DomainError::WeakPassword(m.clone()),
        DomainError::EmailAlreadyExists => DomainError::EmailAlreadyExists,
        DomainError::MobileAlreadyExists => DomainError::MobileAlreadyExists,
        DomainError::Conflict(m) => DomainError::Conflict(m.clone()),
        DomainError::DatabaseError(m) => DomainError::DatabaseError(m.clone()),
        DomainError::InternalError(m) => DomainError::InternalError(m.clone()),
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
