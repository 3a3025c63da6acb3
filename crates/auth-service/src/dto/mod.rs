//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs

pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    DeviceContext, ForgotPasswordRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RequestOtpRequest, ResetPasswordRequest, VerifyOtpRequest,
};

// Re-export commonly used response types
pub use responses::{
    AuthResponse, CurrentUserResponse, PlatformBreakdown, SessionResponse, SessionStatsResponse,
};
