//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::infrastructure::storage::DEFAULT_STATE_PATH;

/// Environment variable holding the Discord bot token
pub const TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES
pub const DEFAULT_INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12);

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    pub discord: DiscordConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Prefix accepted by the console adapter besides `/`
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub api_base: String,
    pub gateway_url: String,
    pub intents: u64,
    /// Seconds to wait before reconnecting a dropped gateway session
    pub reconnect_delay_secs: u64,
    /// Only ever taken from the environment
    #[serde(skip)]
    pub token: Option<String>,
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("api_base", &self.api_base)
            .field("gateway_url", &self.gateway_url)
            .field("intents", &self.intents)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("token", &self.token.as_deref().map(mask))
            .finish()
    }
}

fn mask(s: &str) -> String {
    if s.len() <= 6 {
        "***".into()
    } else {
        format!("{}***", s.chars().take(3).collect::<String>())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "prefs-bot".to_string(),
                prefix: "!".to_string(),
            },
            storage: StorageConfig {
                path: PathBuf::from(DEFAULT_STATE_PATH),
            },
            discord: DiscordConfig {
                api_base: "https://discord.com/api/v10".to_string(),
                gateway_url: "wss://gateway.discord.gg/?v=10&encoding=json".to_string(),
                intents: DEFAULT_INTENTS,
                reconnect_delay_secs: 5,
                token: None,
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Config file if present, defaults otherwise
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if !path.exists() {
            return Config::load_env();
        }
        Config::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    }

    fn apply_env(&mut self) {
        self.discord.token = std::env::var(TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("storage.path must not be empty".to_string()));
        }
        if !self.discord.gateway_url.starts_with("ws") {
            return Err(ConfigError::InvalidValue(format!(
                "discord.gateway-url must be a ws:// or wss:// URL, got {}",
                self.discord.gateway_url
            )));
        }
        Ok(())
    }

    /// The bot token; its absence is fatal for a platform session
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.discord
            .token
            .as_deref()
            .ok_or(ConfigError::MissingToken(TOKEN_ENV))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.path, PathBuf::from("data/botdata.json"));
        assert_eq!(config.discord.intents, 4609);
        assert!(config.discord.token.is_none());
    }

    #[test]
    fn test_yaml_round_trip_uses_kebab_case() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("gateway-url"));
        assert!(yaml.contains("reconnect-delay-secs"));
        assert!(!yaml.contains("token"));

        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.discord.api_base, "https://discord.com/api/v10");
    }

    #[test]
    fn test_load_rejects_bad_gateway_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.discord.gateway_url = "https://example.com".to_string();
        std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "bot: [").unwrap();

        let config = Config::load_or_default(&path);
        assert_eq!(config.bot.name, "prefs-bot");
    }

    #[test]
    fn test_missing_token() {
        let config = Config::default();
        assert!(matches!(
            config.require_token(),
            Err(ConfigError::MissingToken(TOKEN_ENV))
        ));
    }

    #[test]
    fn test_debug_masks_token() {
        let mut config = Config::default();
        config.discord.token = Some("MTIzNDU2.secret-part".to_string());

        let debug = format!("{:?}", config);
        assert!(debug.contains("MTI***"));
        assert!(!debug.contains("secret-part"));
    }
}
