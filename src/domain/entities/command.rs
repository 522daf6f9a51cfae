use super::{ArgValue, Invocation};
use crate::application::errors::CommandError;

pub const SETTINGS: &str = "settings";
pub const RELOAD: &str = "reload";
pub const DM_ENABLED: &str = "dm_enabled";

/// Who may invoke a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Everyone,
    Administrator,
}

/// Parameter type of a command option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Boolean,
}

/// A declared command parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
}

/// A remotely invokable command declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub access: Access,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            access: Access::Everyone,
        }
    }

    pub fn with_option(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: OptionKind,
        required: bool,
    ) -> Self {
        self.options.push(OptionSpec {
            name: name.into(),
            description: description.into(),
            kind,
            required,
        });
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.access = Access::Administrator;
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
    }
}

/// The bot's command declaration, in declaration order
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The commands this bot exposes
    pub fn declared() -> Self {
        let mut registry = Self::new();
        registry.register(
            CommandSpec::new(SETTINGS, "Update your DM preferences").with_option(
                DM_ENABLED,
                "Enable or disable DM notifications (true/false)",
                OptionKind::Boolean,
                true,
            ),
        );
        registry.register(
            CommandSpec::new(RELOAD, "Reloads the bot's commands (Admin only)").admin_only(),
        );
        registry
    }

    /// Add a command, replacing any earlier declaration with the same name
    pub fn register(&mut self, command: CommandSpec) {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    pub fn find(&self, input: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.matches(input))
    }

    pub fn all(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// A parsed, typed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Settings { dm_enabled: bool },
    Reload,
}

impl TryFrom<&Invocation> for BotCommand {
    type Error = CommandError;

    fn try_from(invocation: &Invocation) -> Result<Self, Self::Error> {
        match invocation.name.as_str() {
            SETTINGS => {
                let dm_enabled = match invocation.arg(DM_ENABLED) {
                    Some(ArgValue::Bool(b)) => *b,
                    Some(other) => {
                        return Err(CommandError::InvalidArgs(format!(
                            "{} must be a boolean, got {}",
                            DM_ENABLED,
                            other.kind()
                        )))
                    }
                    None => {
                        return Err(CommandError::InvalidArgs(format!(
                            "missing required option {}",
                            DM_ENABLED
                        )))
                    }
                };
                Ok(BotCommand::Settings { dm_enabled })
            }
            RELOAD => Ok(BotCommand::Reload),
            other => Err(CommandError::NotFound(other.to_string())),
        }
    }
}
