//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::{BotError, SyncError};
use crate::domain::entities::{CommandSpec, Invocation, Reply};
use crate::domain::traits::{Bot, BotInfo, CommandSync};

/// Console bot adapter for local development.
///
/// Replies go to stdout and command sync only logs what would be registered.
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "prefs-bot".to_string(),
                username: "console".to_string(),
            },
        }
    }

    pub fn stdin_lines() -> Lines<BufReader<Stdin>> {
        BufReader::new(tokio::io::stdin()).lines()
    }

    pub fn format_reply(reply: &Reply) -> String {
        if reply.ephemeral {
            format!("[BOT] (only you) {}", reply.content)
        } else {
            format!("[BOT] {}", reply.content)
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn respond(&self, _invocation: &Invocation, reply: &Reply) -> Result<(), BotError> {
        println!("{}", Self::format_reply(reply));
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[async_trait]
impl CommandSync for ConsoleAdapter {
    async fn sync_commands(&self, commands: &[CommandSpec]) -> Result<usize, SyncError> {
        for command in commands {
            tracing::info!("[console] /{} - {}", command.name, command.description);
        }
        Ok(commands.len())
    }
}
