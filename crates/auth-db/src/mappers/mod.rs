//! Model to entity mappers
//!
//! Conversions from database rows to domain objects. Rows carrying a role or
//! purpose tag that no longer parses surface a `DomainError` instead of
//! silently defaulting.

mod otp;
mod password_reset_token;
mod refresh_token;
mod user;
