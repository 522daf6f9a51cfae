//! Invocation parser - Turns typed text lines into structured invocations

use crate::domain::entities::{ArgValue, CommandRegistry, Invocation, OptionKind, User};

/// Parses text such as `/settings true` or `/settings dm_enabled:false`
/// against the declared command options
pub struct InvocationParser {
    command_prefix: String,
    registry: CommandRegistry,
}

impl InvocationParser {
    pub fn new(prefix: impl Into<String>, registry: CommandRegistry) -> Self {
        Self {
            command_prefix: prefix.into(),
            registry,
        }
    }

    /// Parse a line; returns None when it is not a command
    pub fn parse(&self, text: &str, invoker: User) -> Option<Invocation> {
        let text = text.trim();
        let cmd_text = text
            .strip_prefix('/')
            .or_else(|| text.strip_prefix(self.command_prefix.as_str()))?;

        let mut parts = cmd_text.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let mut invocation = Invocation::new(name.clone(), invoker);

        let options = self
            .registry
            .find(&name)
            .map(|c| c.options.as_slice())
            .unwrap_or_default();

        for (position, raw) in parts.enumerate() {
            let (key, value) = match raw.split_once(':') {
                Some((k, v)) => (Some(k), v),
                None => (None, raw),
            };

            let spec = match key {
                Some(k) => options.iter().find(|o| o.name == k),
                None => options.get(position),
            };

            let Some(spec) = spec else {
                let key = key.map(str::to_string).unwrap_or_else(|| format!("arg{}", position));
                invocation = invocation.with_arg(key, ArgValue::Text(value.to_string()));
                continue;
            };

            invocation = invocation.with_arg(spec.name.clone(), convert(spec.kind, value));
        }

        Some(invocation)
    }
}

fn convert(kind: OptionKind, value: &str) -> ArgValue {
    match kind {
        OptionKind::Boolean => match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => ArgValue::Bool(true),
            "false" | "no" | "off" | "0" => ArgValue::Bool(false),
            _ => ArgValue::Text(value.to_string()),
        },
    }
}
