use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::services::{StateService, SyncService};
use crate::domain::entities::{BotCommand, Invocation, Reply, User, UserSettings};

pub const PERMISSION_DENIED: &str = "❌ You do not have permission to use this command.";
pub const SAVE_FAILED: &str = "❌ Could not save your settings right now. Please try again later.";

/// Service for executing commands against the bot state
pub struct CommandService {
    state: Arc<StateService>,
    sync: Arc<SyncService>,
}

impl CommandService {
    pub fn new(state: Arc<StateService>, sync: Arc<SyncService>) -> Self {
        Self { state, sync }
    }

    /// Run an invocation and produce the reply for the invoker.
    ///
    /// Never fails: every error kind becomes a private message.
    pub async fn handle(&self, invocation: &Invocation) -> Reply {
        tracing::info!(
            "/{} from {} ({}) via {}",
            invocation.name,
            invocation.invoker,
            invocation.invoker.id,
            invocation.platform
        );

        match self.execute(invocation).await {
            Ok(reply) => reply,
            Err(CommandError::NotFound(name)) => {
                tracing::warn!("Unknown command /{}", name);
                Reply::private(format!("❌ Unknown command: /{}", name))
            }
            Err(CommandError::InvalidArgs(msg)) => Reply::private(format!("❌ Invalid arguments: {}", msg)),
            Err(CommandError::PermissionDenied) => Reply::private(PERMISSION_DENIED),
            Err(CommandError::Sync(e)) => {
                tracing::warn!("Reload by {} failed: {}", invocation.invoker.id, e);
                Reply::private(format!("❌ Reload failed: {}", e))
            }
            Err(CommandError::Storage(e)) => {
                tracing::error!("/{} by {} could not persist: {}", invocation.name, invocation.invoker.id, e);
                Reply::private(SAVE_FAILED)
            }
        }
    }

    async fn execute(&self, invocation: &Invocation) -> Result<Reply, CommandError> {
        match BotCommand::try_from(invocation)? {
            BotCommand::Settings { dm_enabled } => self.settings(&invocation.invoker, dm_enabled).await,
            BotCommand::Reload => self.reload(&invocation.invoker).await,
        }
    }

    async fn settings(&self, invoker: &User, dm_enabled: bool) -> Result<Reply, CommandError> {
        self.state
            .set_user_settings(&invoker.id, UserSettings::new(dm_enabled))
            .await?;

        Ok(Reply::private(format!(
            "✅ DM notifications {}",
            if dm_enabled { "enabled" } else { "disabled" }
        )))
    }

    async fn reload(&self, invoker: &User) -> Result<Reply, CommandError> {
        if !invoker.is_administrator {
            return Err(CommandError::PermissionDenied);
        }

        let count = self.sync.sync().await?;
        Ok(Reply::private(format!(
            "✅ Commands reloaded successfully ({} synced).",
            count
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::fakes::{FakeSync, MemoryStore};
    use crate::domain::entities::command::{DM_ENABLED, RELOAD, SETTINGS};
    use crate::domain::entities::{ArgValue, CommandRegistry};

    struct Harness {
        store: Arc<MemoryStore>,
        platform: Arc<FakeSync>,
        state: Arc<StateService>,
        commands: CommandService,
    }

    async fn harness(platform: FakeSync) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let platform = Arc::new(platform);
        let state = Arc::new(StateService::load(store.clone()).await.unwrap());
        let sync = Arc::new(SyncService::new(CommandRegistry::declared(), platform.clone()));
        let commands = CommandService::new(state.clone(), sync);
        Harness {
            store,
            platform,
            state,
            commands,
        }
    }

    fn settings(user: &str, dm_enabled: bool) -> Invocation {
        Invocation::new(SETTINGS, User::new(user)).with_arg(DM_ENABLED, ArgValue::Bool(dm_enabled))
    }

    fn reload(admin: bool) -> Invocation {
        Invocation::new(RELOAD, User::new("admin-or-not").with_administrator(admin))
    }

    #[tokio::test]
    async fn test_settings_enable_and_disable() {
        let h = harness(FakeSync::new()).await;

        let reply = h.commands.handle(&settings("u", true)).await;
        assert_eq!(reply, Reply::private("✅ DM notifications enabled"));

        let reply = h.commands.handle(&settings("u", false)).await;
        assert_eq!(reply, Reply::private("✅ DM notifications disabled"));

        assert_eq!(h.store.persisted().user_settings("u"), Some(UserSettings::new(false)));
        assert_eq!(h.store.saves(), 2);
    }

    #[tokio::test]
    async fn test_settings_twice_is_idempotent() {
        let h = harness(FakeSync::new()).await;

        h.commands.handle(&settings("u", true)).await;
        let reply = h.commands.handle(&settings("u", true)).await;

        assert!(reply.content.starts_with('✅'));
        let state = h.state.snapshot().await;
        assert_eq!(state.settings.len(), 1);
        assert_eq!(state.user_settings("u"), Some(UserSettings::new(true)));
    }

    #[tokio::test]
    async fn test_settings_save_failure_is_reported() {
        let h = harness(FakeSync::new()).await;
        h.store.fail_saves(true);

        let reply = h.commands.handle(&settings("u", true)).await;

        assert_eq!(reply, Reply::private(SAVE_FAILED));
        assert_eq!(h.state.user_settings("u").await, None);
    }

    #[tokio::test]
    async fn test_reload_denied_for_non_admin() {
        let h = harness(FakeSync::new()).await;

        let reply = h.commands.handle(&reload(false)).await;

        assert_eq!(reply, Reply::private(PERMISSION_DENIED));
        assert_eq!(h.platform.calls(), 0);
    }

    #[tokio::test]
    async fn test_reload_by_admin_reports_count() {
        let h = harness(FakeSync::new()).await;

        let reply = h.commands.handle(&reload(true)).await;

        assert_eq!(reply, Reply::private("✅ Commands reloaded successfully (2 synced)."));
        assert_eq!(h.platform.calls(), 1);
    }

    #[tokio::test]
    async fn test_reload_sync_failure_is_reported() {
        let h = harness(FakeSync::failing()).await;

        let reply = h.commands.handle(&reload(true)).await;

        assert!(reply.ephemeral);
        assert!(reply.content.starts_with("❌ Reload failed:"));
        assert!(reply.content.contains("Missing Access"));
    }

    #[tokio::test]
    async fn test_unknown_command_and_bad_args() {
        let h = harness(FakeSync::new()).await;

        let reply = h.commands.handle(&Invocation::new("ping", User::new("u"))).await;
        assert_eq!(reply.content, "❌ Unknown command: /ping");

        let reply = h.commands.handle(&Invocation::new(SETTINGS, User::new("u"))).await;
        assert!(reply.content.starts_with("❌ Invalid arguments"));
        assert_eq!(h.store.saves(), 0);
    }
}
