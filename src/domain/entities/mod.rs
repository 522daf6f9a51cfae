//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod invocation;
pub mod state;
pub mod user;

pub use command::{Access, BotCommand, CommandRegistry, CommandSpec, OptionKind};
pub use invocation::{ArgValue, Invocation, Reply};
pub use state::{BotState, UserSettings};
pub use user::User;
