// framework/mod.rs - Command resolution and dispatch core
// Prefix matching, tokenizing, command/alias lookup, context construction,
// invocation and error containment. Knows nothing about any chat platform.

pub mod bot;
pub mod cog;
pub mod command;
pub mod context;
pub mod cooldown;
pub mod error;
pub mod loader;
pub mod prefix;
pub mod registry;

pub use bot::{Bot, BotBuilder, Dispatch, ErrorHook, ReportError};
pub use cog::Cog;
pub use command::{Command, CommandHandler};
pub use context::{Author, Context, InboundMessage, ReplyChannel};
pub use cooldown::Cooldown;
pub use error::{CommandError, CooldownError, FrameworkError, HandlerError, HandlerResult, LoadError};
pub use loader::{ModuleLoader, SetupFn};
pub use prefix::{Prefix, PrefixResolver};
pub use registry::CommandRegistry;
