//! # auth-core
//!
//! Domain layer containing entities, value objects, repository traits, and
//! collaborator boundaries for the authentication and session engine.
//! This crate has zero dependencies on infrastructure (database, transport, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_otp_code, generate_token_value, Mobile, Otp, OtpPurpose, PasswordResetToken,
    RefreshToken, SessionState, User, UserRole,
};
pub use error::DomainError;
pub use traits::{
    BiometricTokenVault, NoopBiometricVault, NoopOtpSender, OtpRepository, OtpSender,
    PasswordResetRepository, RefreshTokenRepository, RepoResult, ResetConsumption,
    UserRepository,
};
pub use value_objects::{Platform, Snowflake, SnowflakeGenerator, SnowflakeParseError};
