use std::fmt;

/// The platform user who invoked a command
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    /// Stable platform identifier, used as the settings key
    pub id: String,
    pub username: Option<String>,
    pub global_name: Option<String>,
    /// Administrator privilege as reported by the platform
    pub is_administrator: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            global_name: None,
            is_administrator: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_global_name(mut self, name: Option<impl Into<String>>) -> Self {
        self.global_name = name.map(|n| n.into());
        self
    }

    pub fn with_administrator(mut self, is_administrator: bool) -> Self {
        self.is_administrator = is_administrator;
        self
    }

    pub fn display_name(&self) -> String {
        if let Some(ref name) = self.global_name {
            name.clone()
        } else if let Some(ref username) = self.username {
            username.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
