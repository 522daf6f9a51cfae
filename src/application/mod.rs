//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: state, command sync and command handling
//! - Errors: Domain-specific errors
//! - Messaging: parsing typed text into invocations

pub mod errors;
pub mod messaging;
pub mod services;
