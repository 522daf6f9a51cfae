//! Application services - Business logic orchestration

pub mod command_service;
pub mod state_service;
pub mod sync_service;

#[cfg(test)]
pub(crate) mod fakes;

pub use command_service::CommandService;
pub use state_service::StateService;
pub use sync_service::SyncService;
