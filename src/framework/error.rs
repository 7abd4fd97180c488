// error.rs - Framework error taxonomy
// Registration and loading errors surface to the caller. Everything raised
// while a command runs is wrapped in CommandError and contained by the
// dispatcher.

use std::time::Duration;
use thiserror::Error;

/// Error type command handlers return. Any `std::error::Error` converts into
/// it with `?`, so handlers never need their own top-level guards.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result type every command handler returns.
pub type HandlerResult = Result<(), HandlerError>;

/// Errors from registry and cog bookkeeping.
#[derive(Debug, Error)]
pub enum FrameworkError {
    /// A command name or alias is already taken by another command.
    #[error("command name or alias `{0}` is already registered")]
    DuplicateCommand(String),

    #[error("cog `{0}` is already loaded")]
    DuplicateCog(String),

    #[error("cog `{0}` is not loaded")]
    CogNotFound(String),

    /// An extension could not build something it needs, e.g. an HTTP client.
    #[error("extension setup failed: {0}")]
    Setup(String),
}

/// Raised when an invocation exceeds the command's rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("this command is on cooldown, try again in {:.1}s", .retry_after.as_secs_f64())]
pub struct CooldownError {
    pub retry_after: Duration,
}

impl CooldownError {
    /// Time left until the oldest recorded invocation leaves the window.
    pub fn retry_after(&self) -> Duration {
        self.retry_after
    }
}

/// Errors from loading an extension module.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no extension named `{0}` has a registered setup function")]
    NoEntryPoint(String),

    #[error("setup of extension `{module}` failed: {source}")]
    Setup {
        module: String,
        #[source]
        source: FrameworkError,
    },
}

/// Everything that can go wrong once a command has been resolved.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Cooldown(#[from] CooldownError),

    #[error("{0}")]
    Handler(HandlerError),

    #[error("command panicked: {0}")]
    Panicked(String),
}

impl CommandError {
    pub fn is_cooldown(&self) -> bool {
        matches!(self, CommandError::Cooldown(_))
    }
}
