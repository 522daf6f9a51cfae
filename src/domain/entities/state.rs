use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-user preferences.
///
/// Fields other than `dm_enabled` are kept in `extra` and written back as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Whether the user opted in to direct-message notifications
    #[serde(default)]
    pub dm_enabled: bool,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl UserSettings {
    pub fn new(dm_enabled: bool) -> Self {
        Self {
            dm_enabled,
            extra: BTreeMap::new(),
        }
    }
}

/// The whole persisted bot state.
///
/// Absent top-level keys load as empty maps. Keys this version does not know
/// about are kept in `extra` so a save never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotState {
    /// Reserved for rate limiting; carried through untouched
    #[serde(default)]
    pub cooldowns: BTreeMap<String, Value>,

    #[serde(default)]
    pub settings: BTreeMap<String, UserSettings>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BotState {
    #[cfg(test)]
    pub fn user_settings(&self, user_id: &str) -> Option<UserSettings> {
        self.settings.get(user_id).cloned()
    }

    /// Replace the user's record as a whole
    pub fn set_user_settings(&mut self, user_id: impl Into<String>, settings: UserSettings) {
        self.settings.insert(user_id.into(), settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_default_to_empty() {
        let state: BotState = serde_json::from_str("{}").unwrap();
        assert!(state.settings.is_empty());
        assert!(state.cooldowns.is_empty());
        assert!(state.extra.is_empty());
    }

    #[test]
    fn test_wire_names() {
        let mut state = BotState::default();
        state.set_user_settings("user42", UserSettings::new(true));

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({"cooldowns": {}, "settings": {"user42": {"dm_enabled": true}}})
        );
    }

    #[test]
    fn test_unknown_top_level_keys_survive() {
        let raw = json!({
            "cooldowns": {"daily:1": 1700000000},
            "settings": {},
            "schema": 2
        });
        let state: BotState = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(state.extra.get("schema"), Some(&json!(2)));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_missing_dm_enabled_is_opt_out() {
        let state: BotState = serde_json::from_str(r#"{"settings": {"7": {}}}"#).unwrap();
        assert_eq!(state.user_settings("7"), Some(UserSettings::new(false)));
    }

    #[test]
    fn test_unknown_user_fields_survive() {
        let raw = json!({
            "cooldowns": {},
            "settings": {"alice": {"dm_enabled": true, "lang": "fr"}}
        });
        let state: BotState = serde_json::from_value(raw.clone()).unwrap();
        let alice = state.user_settings("alice").unwrap();
        assert!(alice.dm_enabled);
        assert_eq!(alice.extra.get("lang"), Some(&json!("fr")));
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<BotState>(r#"{"settings": []}"#).is_err());
        assert!(serde_json::from_str::<BotState>(r#"{"settings": {"1": {"dm_enabled": "yes"}}}"#).is_err());
        assert!(serde_json::from_str::<BotState>("[]").is_err());
    }

    #[test]
    fn test_set_replaces_record() {
        let mut state = BotState::default();
        state.set_user_settings("u", UserSettings::new(true));
        state.set_user_settings("u", UserSettings::new(false));
        assert_eq!(state.settings.len(), 1);
        assert_eq!(state.user_settings("u"), Some(UserSettings::new(false)));
    }
}
