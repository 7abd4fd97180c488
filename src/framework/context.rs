// context.rs - Inbound messages and per-invocation contexts
// The transport hands the bot an InboundMessage carrying a reply capability
// bound to the originating channel. The dispatcher wraps it in a Context,
// which is the only thing a command handler sees.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::bot::Bot;
use super::command::Command;
use super::error::HandlerResult;

/// Outgoing-text capability for one channel, supplied by the transport.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    async fn send(&self, content: &str) -> HandlerResult;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub name: String,
}

/// A chat message as delivered by the transport.
#[derive(Clone)]
pub struct InboundMessage {
    pub content: String,
    pub author: Author,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub reply: Arc<dyn ReplyChannel>,
}

impl fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundMessage")
            .field("content", &self.content)
            .field("author", &self.author)
            .field("channel_id", &self.channel_id)
            .field("guild_id", &self.guild_id)
            .finish_non_exhaustive()
    }
}

/// Everything a command handler knows about the invocation that triggered it.
///
/// Built once per invocation and never mutated. Cloning is cheap: the message,
/// bot and command are shared.
#[derive(Clone)]
pub struct Context {
    message: Arc<InboundMessage>,
    bot: Arc<Bot>,
    command: Arc<Command>,
    prefix: String,
    invoker: String,
    args: Vec<String>,
}

impl Context {
    /// Assembles a context. Pure construction, no I/O.
    pub fn new(
        message: Arc<InboundMessage>,
        bot: Arc<Bot>,
        command: Arc<Command>,
        prefix: impl Into<String>,
        invoker: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            message,
            bot,
            command,
            prefix: prefix.into(),
            invoker: invoker.into(),
            args,
        }
    }

    pub fn message(&self) -> &InboundMessage {
        &self.message
    }

    pub fn author(&self) -> &Author {
        &self.message.author
    }

    pub fn channel_id(&self) -> u64 {
        self.message.channel_id
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.message.guild_id
    }

    pub fn bot(&self) -> &Arc<Bot> {
        &self.bot
    }

    pub fn command(&self) -> &Arc<Command> {
        &self.command
    }

    /// The prefix the message matched.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The token the command was invoked by: its name or one of its aliases.
    pub fn invoker(&self) -> &str {
        &self.invoker
    }

    /// Tokens after the invoker.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Sends text back to the channel the message came from.
    pub async fn send(&self, content: impl AsRef<str>) -> HandlerResult {
        self.message.reply.send(content.as_ref()).await
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("command", &self.command.name())
            .field("prefix", &self.prefix)
            .field("invoker", &self.invoker)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
