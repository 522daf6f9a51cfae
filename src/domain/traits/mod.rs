//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod store;
pub mod sync;

pub use bot::{Bot, BotInfo};
pub use store::StateStore;
pub use sync::CommandSync;
