//! Discord adapter
//!
//! REST calls (command sync, interaction replies) live here; the live event
//! stream is in [`gateway`].

pub mod gateway;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::RwLock;

use crate::application::errors::{BotError, SyncError};
use crate::domain::entities::{ArgValue, CommandSpec, Invocation, Reply, User};
use crate::domain::traits::{Bot, BotInfo, CommandSync};
use crate::infrastructure::config::DiscordConfig;

pub use gateway::{GatewayEvent, GatewaySession};
use types::{
    ApplicationCommand, Interaction, InteractionResponse, InteractionResponseData, Ready,
    RegisteredCommand, APPLICATION_COMMAND, CHANNEL_MESSAGE_WITH_SOURCE, EPHEMERAL,
};

pub const PLATFORM: &str = "discord";

/// Identity learned from the READY event
#[derive(Debug, Clone, Default)]
struct Identity {
    info: BotInfo,
    application_id: Option<String>,
}

/// Discord bot adapter
pub struct DiscordAdapter {
    token: String,
    api_base: String,
    client: Client,
    identity: RwLock<Identity>,
}

impl DiscordAdapter {
    pub fn new(config: &DiscordConfig, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
            identity: RwLock::new(Identity::default()),
        }
    }

    /// Get the API URL for a path
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Record who we are once the gateway says READY
    pub fn set_ready(&self, ready: &Ready) {
        let info = BotInfo {
            id: ready.user.id.clone(),
            name: ready.user.global_name.clone().unwrap_or_else(|| ready.user.username.clone()),
            username: ready.user.tag(),
        };
        if let Ok(mut identity) = self.identity.write() {
            identity.info = info;
            identity.application_id = Some(ready.application.id.clone());
        }
    }

    pub fn application_id(&self) -> Option<String> {
        self.identity
            .read()
            .ok()
            .and_then(|identity| identity.application_id.clone())
    }

    /// Convert a slash-command interaction into an invocation.
    /// Other interaction types (autocomplete, components, pings) are ignored.
    pub fn to_invocation(&self, interaction: &Interaction) -> Option<Invocation> {
        if interaction.kind != APPLICATION_COMMAND {
            tracing::debug!("Ignoring interaction type {}", interaction.kind);
            return None;
        }
        let data = interaction.data.as_ref()?;
        let Some(user) = interaction.invoker() else {
            tracing::warn!("Interaction {} has no invoking user", interaction.id);
            return None;
        };

        let invoker = User::new(&user.id)
            .with_username(&user.username)
            .with_global_name(user.global_name.as_deref())
            .with_administrator(interaction.is_administrator());

        let mut invocation = Invocation::new(&data.name, invoker)
            .with_handle(&interaction.id, &interaction.token)
            .with_platform(PLATFORM);

        for option in &data.options {
            let value = match &option.value {
                Some(serde_json::Value::Bool(b)) => ArgValue::Bool(*b),
                Some(serde_json::Value::Number(n)) if n.is_i64() => {
                    ArgValue::Integer(n.as_i64().unwrap_or_default())
                }
                Some(serde_json::Value::String(s)) => ArgValue::Text(s.clone()),
                Some(other) => ArgValue::Text(other.to_string()),
                None => continue,
            };
            invocation = invocation.with_arg(&option.name, value);
        }

        Some(invocation)
    }
}

#[async_trait]
impl CommandSync for DiscordAdapter {
    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<usize, SyncError> {
        let application_id = self.application_id().ok_or(SyncError::NotReady)?;
        let payload: Vec<ApplicationCommand> = commands.iter().map(Into::into).collect();

        let url = self.api_url(&format!("applications/{}/commands", application_id));
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let registered: Vec<RegisteredCommand> = response
            .json()
            .await
            .map_err(|e| SyncError::Parse(e.to_string()))?;

        for command in &registered {
            tracing::debug!("Registered /{} ({})", command.name, command.id);
        }
        Ok(registered.len())
    }
}

#[async_trait]
impl Bot for DiscordAdapter {
    async fn respond(&self, invocation: &Invocation, reply: &Reply) -> Result<(), BotError> {
        let url = self.api_url(&format!(
            "interactions/{}/{}/callback",
            invocation.id, invocation.token
        ));
        let body = InteractionResponse {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: InteractionResponseData {
                content: reply.content.clone(),
                flags: reply.ephemeral.then_some(EPHEMERAL),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!(
                "Discord API error {}: {}",
                status, error
            )));
        }

        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.identity
            .read()
            .map(|identity| identity.info.clone())
            .unwrap_or_default()
    }
}
