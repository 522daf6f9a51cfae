use async_trait::async_trait;
use crate::domain::entities::BotState;
use crate::application::errors::StorageError;

/// StateStore trait - durable copy of the bot state
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the persisted state, defaulting when nothing has been saved yet
    async fn load(&self) -> Result<BotState, StorageError>;

    /// Overwrite the persisted state with `state`
    async fn save(&self, state: &BotState) -> Result<(), StorageError>;
}
