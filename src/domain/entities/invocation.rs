use super::User;

/// A typed command argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl ArgValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Bool(_) => "boolean",
            ArgValue::Integer(_) => "integer",
            ArgValue::Text(_) => "string",
        }
    }
}

/// A named argument supplied with an invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArg {
    pub name: String,
    pub value: ArgValue,
}

impl CommandArg {
    pub fn new(name: impl Into<String>, value: ArgValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// An inbound command invocation delivered by the session
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Platform id of the invocation
    pub id: String,
    /// Opaque handle the platform needs to answer this invocation
    pub token: String,
    pub name: String,
    pub args: Vec<CommandArg>,
    pub invoker: User,
    pub platform: String,
}

impl Invocation {
    pub fn new(name: impl Into<String>, invoker: User) -> Self {
        Self {
            id: String::new(),
            token: String::new(),
            name: name.into(),
            args: Vec::new(),
            invoker,
            platform: "unknown".to_string(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.args.push(CommandArg::new(name, value));
        self
    }

    pub fn with_handle(mut self, id: impl Into<String>, token: impl Into<String>) -> Self {
        self.id = id.into();
        self.token = token.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn arg(&self, name: &str) -> Option<&ArgValue> {
        self.args.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// A response to an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the invoker
    pub ephemeral: bool,
}

impl Reply {
    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}
