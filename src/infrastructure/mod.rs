//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: State file persistence
//! - Adapters: Platform integrations (Discord, console)

pub mod adapters;
pub mod config;
pub mod storage;
