//! Domain layer - Core business types and the seams to infrastructure
//!
//! This layer contains:
//! - Entities: persisted state, command declarations, invocations
//! - Traits: Bot, StateStore, CommandSync

pub mod entities;
pub mod traits;
