use std::sync::Arc;

use crate::application::errors::SyncError;
use crate::domain::entities::CommandRegistry;
use crate::domain::traits::CommandSync;

/// Keeps the platform's registered commands in step with the local declaration
pub struct SyncService {
    registry: CommandRegistry,
    platform: Arc<dyn CommandSync>,
}

impl SyncService {
    pub fn new(registry: CommandRegistry, platform: Arc<dyn CommandSync>) -> Self {
        Self { registry, platform }
    }

    /// Push the full declaration, replacing whatever the platform had
    pub async fn sync(&self) -> Result<usize, SyncError> {
        let count = self.platform.sync_commands(self.registry.all()).await?;
        tracing::debug!("Synchronized {} of {} declared commands", count, self.registry.len());
        Ok(count)
    }

    /// Startup sync: failures are logged and the bot keeps running
    pub async fn sync_on_ready(&self) -> Option<usize> {
        match self.sync().await {
            Ok(count) => {
                tracing::info!("Synced {} slash commands.", count);
                Some(count)
            }
            Err(e) => {
                tracing::error!("Failed to sync commands: {}", e);
                None
            }
        }
    }
}
