use async_trait::async_trait;
use crate::domain::entities::CommandSpec;
use crate::application::errors::SyncError;

/// Pushes command declarations to the platform
#[async_trait]
pub trait CommandSync: Send + Sync {
    /// Replace the platform's registered commands with `commands`.
    /// Returns how many commands the platform reports as registered.
    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<usize, SyncError>;
}
