//! # auth-common
//!
//! Shared utilities including configuration, error handling, credential
//! hashing, access-token signing, the clock abstraction, and telemetry.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_password, AccessClaims, JwtService,
    PasswordService,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, JwtConfig, OtpConfig,
    PasswordResetConfig, RetentionConfig, SessionConfig, SnowflakeConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use hash::SecretHasher;
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
