//! Discord wire types (gateway payloads, interactions, application commands)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{Access, CommandSpec, OptionKind};

/// ADMINISTRATOR permission bit
pub const ADMINISTRATOR: u64 = 1 << 3;

/// Interaction type for slash commands
pub const APPLICATION_COMMAND: u8 = 2;

/// Interaction callback type: respond with a message
pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;

/// Message flag: only the invoker can see it
pub const EPHEMERAL: u64 = 1 << 6;

pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Inbound gateway frame
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    pub s: Option<u64>,
    pub t: Option<String>,
}

/// Outbound gateway frame
#[derive(Debug, Serialize)]
pub struct OutgoingPayload<T: Serialize> {
    pub op: u8,
    pub d: T,
}

#[derive(Debug, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Serialize)]
pub struct Identify<'a> {
    pub token: &'a str,
    pub intents: u64,
    pub properties: IdentifyProperties,
}

#[derive(Debug, Serialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl IdentifyProperties {
    pub fn new(name: &str) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: name.to_string(),
            device: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl DiscordUser {
    /// `name#1234` for legacy accounts, `name` otherwise
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialApplication {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ready {
    pub user: DiscordUser,
    pub application: PartialApplication,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: Option<DiscordUser>,
    /// Permission bitfield serialized as a decimal string
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub token: String,
    pub data: Option<InteractionData>,
    /// Present for guild invocations
    pub member: Option<Member>,
    /// Present for DM invocations
    pub user: Option<DiscordUser>,
}

impl Interaction {
    pub fn invoker(&self) -> Option<&DiscordUser> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Outside a guild there are no guild permissions, so never admin
    pub fn is_administrator(&self) -> bool {
        self.member
            .as_ref()
            .and_then(|m| m.permissions.as_deref())
            .and_then(|p| p.parse::<u64>().ok())
            .map(|bits| bits & ADMINISTRATOR != 0)
            .unwrap_or(false)
    }
}

/// Application command as sent to `PUT /applications/{id}/commands`
#[derive(Debug, Serialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ApplicationCommandOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationCommandOption {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl From<&CommandSpec> for ApplicationCommand {
    fn from(spec: &CommandSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            kind: 1,
            options: spec
                .options
                .iter()
                .map(|o| ApplicationCommandOption {
                    kind: option_type(o.kind),
                    name: o.name.clone(),
                    description: o.description.clone(),
                    required: o.required,
                })
                .collect(),
            default_member_permissions: match spec.access {
                Access::Everyone => None,
                Access::Administrator => Some(ADMINISTRATOR.to_string()),
            },
        }
    }
}

pub fn option_type(kind: OptionKind) -> u8 {
    match kind {
        OptionKind::Boolean => 5,
    }
}

/// Body of `POST /interactions/{id}/{token}/callback`
#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: InteractionResponseData,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponseData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

/// Registered command as returned by the bulk overwrite
#[derive(Debug, Deserialize)]
pub struct RegisteredCommand {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CommandRegistry;
    use serde_json::json;

    fn interaction(value: Value) -> Interaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_guild_interaction_admin_bit() {
        let i = interaction(json!({
            "id": "1", "application_id": "9", "type": 2, "token": "tok",
            "guild_id": "5",
            "data": {"id": "c", "name": "reload", "type": 1},
            "member": {"user": {"id": "42", "username": "ada"}, "permissions": "2147483656"}
        }));
        assert_eq!(i.invoker().unwrap().id, "42");
        assert!(i.is_administrator());
    }

    #[test]
    fn test_guild_interaction_without_admin() {
        let i = interaction(json!({
            "id": "1", "application_id": "9", "type": 2, "token": "tok",
            "member": {"user": {"id": "42", "username": "ada"}, "permissions": "2048"}
        }));
        assert!(!i.is_administrator());
    }

    #[test]
    fn test_dm_interaction_is_never_admin() {
        let i = interaction(json!({
            "id": "1", "application_id": "9", "type": 2, "token": "tok",
            "user": {"id": "77", "username": "bob", "global_name": "Bob"}
        }));
        assert_eq!(i.invoker().unwrap().id, "77");
        assert!(!i.is_administrator());
    }

    #[test]
    fn test_command_payloads() {
        let registry = CommandRegistry::declared();
        let payload: Vec<ApplicationCommand> = registry.all().iter().map(Into::into).collect();

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!([
                {
                    "name": "settings",
                    "description": "Update your DM preferences",
                    "type": 1,
                    "options": [{
                        "type": 5,
                        "name": "dm_enabled",
                        "description": "Enable or disable DM notifications (true/false)",
                        "required": true
                    }]
                },
                {
                    "name": "reload",
                    "description": "Reloads the bot's commands (Admin only)",
                    "type": 1,
                    "default_member_permissions": "8"
                }
            ])
        );
    }

    #[test]
    fn test_gateway_payload_without_data() {
        let p: GatewayPayload = serde_json::from_str(r#"{"op": 11}"#).unwrap();
        assert_eq!(p.op, opcode::HEARTBEAT_ACK);
        assert!(p.d.is_null());
        assert!(p.t.is_none());
    }

    #[test]
    fn test_user_tag() {
        let legacy: DiscordUser =
            serde_json::from_value(json!({"id": "1", "username": "a", "discriminator": "0420"})).unwrap();
        let modern: DiscordUser =
            serde_json::from_value(json!({"id": "1", "username": "a", "discriminator": "0"})).unwrap();
        assert_eq!(legacy.tag(), "a#0420");
        assert_eq!(modern.tag(), "a");
    }
}
