// command.rs - Commands and their handlers
// A Command is a name, its aliases, some metadata and an async handler.
// Invoking one checks its cooldown first, then runs the handler.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::context::Context;
use super::cooldown::Cooldown;
use super::error::{CommandError, HandlerResult};

/// The body of a command. Closures and `async fn`s are accepted through
/// [`Command::new`]; implement this directly for handlers that carry state.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, ctx: Context, args: Vec<String>) -> HandlerResult;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Context, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn call(&self, ctx: Context, args: Vec<String>) -> HandlerResult {
        (self.0)(ctx, args).await
    }
}

pub struct Command {
    name: String,
    aliases: Vec<String>,
    description: String,
    cooldown: Option<Cooldown>,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Context, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::with_handler(name, Arc::new(FnHandler(handler)))
    }

    pub fn with_handler(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: String::new(),
            cooldown: None,
            handler,
        }
    }

    /// Adds an alias. Repeats and the command's own name are ignored.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if alias != self.name && !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn aliases<I, S>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        aliases.into_iter().fold(self, |cmd, alias| cmd.alias(alias))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Limits each author to `rate` invocations per `per`.
    pub fn cooldown(mut self, rate: u32, per: Duration) -> Self {
        self.cooldown = Some(Cooldown::new(rate, per));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias_list(&self) -> &[String] {
        &self.aliases
    }

    pub fn about(&self) -> &str {
        &self.description
    }

    pub fn cooldown_policy(&self) -> Option<&Cooldown> {
        self.cooldown.as_ref()
    }

    /// The name followed by every alias: all tokens that resolve to this command.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Checks the cooldown for the invoking author, then runs the handler
    /// with the context's argument tokens.
    pub async fn invoke(&self, ctx: Context) -> Result<(), CommandError> {
        if let Some(cooldown) = &self.cooldown {
            cooldown.check(ctx.author().id)?;
        }

        let args = ctx.args().to_vec();
        self.handler.call(ctx, args).await.map_err(CommandError::Handler)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::bot::Bot;
    use crate::framework::context::testing::{message, RecordingChannel};

    async fn noop(_ctx: Context, _args: Vec<String>) -> HandlerResult {
        Ok(())
    }

    async fn boom(_ctx: Context, _args: Vec<String>) -> HandlerResult {
        Err("kaboom".into())
    }

    fn context_for(command: Arc<Command>, author: u64, args: &[&str]) -> (Context, Arc<RecordingChannel>) {
        let channel = Arc::new(RecordingChannel::default());
        let msg = Arc::new(message("irrelevant", author, channel.clone()));
        let args = args.iter().map(|a| a.to_string()).collect();
        let ctx = Context::new(msg, Bot::builder().build(), command, "!", "x", args);
        (ctx, channel)
    }

    #[test]
    fn test_aliases_skip_duplicates_and_own_name() {
        let cmd = Command::new("coin", noop)
            .aliases(["cflip", "coin", "cflip", "coinflip"]);
        assert_eq!(cmd.alias_list(), ["cflip", "coinflip"]);
        assert_eq!(cmd.keys().collect::<Vec<_>>(), vec!["coin", "cflip", "coinflip"]);
    }

    #[tokio::test]
    async fn test_invoke_passes_args_to_handler() {
        let cmd = Arc::new(Command::new("echo", |ctx: Context, args: Vec<String>| async move {
            ctx.send(args.join("|")).await
        }));
        let (ctx, channel) = context_for(cmd.clone(), 1, &["a", "", "b"]);

        cmd.invoke(ctx).await.unwrap();
        assert_eq!(channel.sent(), vec!["a||b".to_string()]);
    }

    #[tokio::test]
    async fn test_invoke_wraps_handler_failure() {
        let cmd = Arc::new(Command::new("boom", boom));
        let (ctx, _) = context_for(cmd.clone(), 1, &[]);

        match cmd.invoke(ctx).await {
            Err(CommandError::Handler(e)) => assert_eq!(e.to_string(), "kaboom"),
            other => panic!("expected handler error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cooldown_runs_before_handler() {
        let cmd = Arc::new(
            Command::new("once", |ctx: Context, _args| async move { ctx.send("ran").await })
                .cooldown(1, Duration::from_secs(60)),
        );

        let (ctx, channel) = context_for(cmd.clone(), 9, &[]);
        cmd.invoke(ctx.clone()).await.unwrap();
        let err = cmd.invoke(ctx).await.unwrap_err();

        assert!(err.is_cooldown());
        assert_eq!(channel.sent().len(), 1, "handler must not run when on cooldown");
    }
}
