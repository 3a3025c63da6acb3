//! # auth-db
//!
//! Database layer implementing the repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `auth-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Conditional-update implementations of the linearizable operations
//!   (token rotation, OTP consumption, reset consumption)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_db::pool::{create_pool, DatabaseConfig};
//! use auth_db::repositories::PgRefreshTokenRepository;
//! use auth_core::traits::RefreshTokenRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let token_repo = PgRefreshTokenRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{
    PgOtpRepository, PgPasswordResetRepository, PgRefreshTokenRepository, PgUserRepository,
};
