//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in auth-core.
//! The linearizable operations (rotation, OTP consumption, reset
//! consumption) run as conditional updates checked by affected-row count.

mod error;
mod otp;
mod password_reset;
mod refresh_token;
mod user;

pub use otp::PgOtpRepository;
pub use password_reset::PgPasswordResetRepository;
pub use refresh_token::PgRefreshTokenRepository;
pub use user::PgUserRepository;
