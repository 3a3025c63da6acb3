//! Domain entities - core business objects

mod otp;
mod password_reset;
mod refresh_token;
mod user;

pub use otp::{generate_otp_code, Otp, OtpPurpose};
pub use password_reset::PasswordResetToken;
pub use refresh_token::{generate_token_value, RefreshToken, SessionState};
pub use user::{Mobile, User, UserRole};
