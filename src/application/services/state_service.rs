use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{BotState, UserSettings};
use crate::domain::traits::StateStore;

/// Owns the in-memory bot state and keeps the store in step with it.
///
/// Every mutation runs under one lock, including the save, so concurrent
/// handlers cannot lose each other's updates. A mutation is only committed
/// to memory once the store has accepted it.
pub struct StateService {
    state: Mutex<BotState>,
    store: Arc<dyn StateStore>,
}

impl StateService {
    /// Load the persisted state. Corrupt state is returned as an error.
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self, StorageError> {
        let state = store.load().await?;
        tracing::info!("Loaded state for {} users", state.settings.len());
        Ok(Self {
            state: Mutex::new(state),
            store,
        })
    }

    #[cfg(test)]
    pub async fn user_settings(&self, user_id: &str) -> Option<UserSettings> {
        self.state.lock().await.user_settings(user_id)
    }

    #[cfg(test)]
    pub async fn snapshot(&self) -> BotState {
        self.state.lock().await.clone()
    }

    /// Replace a user's settings and persist the full state
    pub async fn set_user_settings(
        &self,
        user_id: &str,
        settings: UserSettings,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;

        let dm_enabled = settings.dm_enabled;
        let mut next = state.clone();
        next.set_user_settings(user_id, settings);
        self.store.save(&next).await?;

        *state = next;
        tracing::debug!("Settings for {} now dm_enabled={}", user_id, dm_enabled);
        Ok(())
    }
}
