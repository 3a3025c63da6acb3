//! Integration test utilities for the authentication engine
//!
//! This crate provides in-memory repository implementations with the same
//! compare-and-swap semantics as the PostgreSQL layer, recording doubles
//! for the delivery and vault collaborators, and a harness that wires them
//! into a `ServiceContext` behind a manual clock.

pub mod memory;

pub use fixtures::*;
pub use helpers::*;
pub use memory::*;
