//! # auth-service
//!
//! Application layer containing business logic, services, and DTOs for the
//! authentication and session lifecycle engine.

pub mod bootstrap;
pub mod dto;
pub mod services;

// Re-export the service surface
pub use bootstrap::{create_service_context, policy_from_config, spawn_retention_sweeper};
pub use services::{
    AuthService, OtpService, PasswordResetService, RetentionSweeper, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, SessionService, SessionStatsService,
};
