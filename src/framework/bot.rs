// bot.rs - The process-wide orchestrator and message dispatcher
// Holds the prefix configuration, the command registry and the cog registry.
// Every inbound message goes through `Bot::dispatch`, which never lets a
// command failure escape.

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use futures_util::FutureExt;
use log::{debug, error, info, warn};

use super::cog::Cog;
use super::command::Command;
use super::context::{Context, InboundMessage};
use super::error::{CommandError, FrameworkError, LoadError};
use super::loader::{ModuleLoader, SetupFn};
use super::prefix::{strip_prefix, tokenize, Prefix};
use super::registry::CommandRegistry;

/// What `Bot::dispatch` did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The message does not start with any active prefix.
    NoPrefix,
    /// A prefix matched but the invoking token names no command.
    UnknownCommand { invoker: String },
    Completed { command: String },
    /// The command failed and the error hook was called.
    Failed { command: String },
}

/// The single recovery point for failures raised while a command runs.
#[async_trait]
pub trait ErrorHook: Send + Sync {
    async fn on_command_error(&self, ctx: &Context, error: &CommandError);
}

/// Default hook: sends the error text back to the originating channel.
pub struct ReportError;

#[async_trait]
impl ErrorHook for ReportError {
    async fn on_command_error(&self, ctx: &Context, error: &CommandError) {
        let text = match error {
            CommandError::Cooldown(cooldown) => format!("⏳ {}", cooldown),
            other => format!("❌ Command `{}` failed:\n```\n{}\n```", ctx.command().name(), other),
        };

        if let Err(e) = ctx.send(text).await {
            error!("[DISPATCH] Could not report failure of '{}' to channel {}: {}",
                ctx.command().name(), ctx.channel_id(), e);
        }
    }
}

pub struct Bot {
    prefix: Prefix,
    commands: RwLock<CommandRegistry>,
    cogs: Mutex<BTreeMap<String, Arc<dyn Cog>>>,
    loader: ModuleLoader,
    error_hook: Arc<dyn ErrorHook>,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn add_command(&self, command: Command) -> Result<(), FrameworkError> {
        let name = command.name().to_string();
        self.registry_mut().add(command)?;
        debug!("[BOT] Registered command '{}'", name);
        Ok(())
    }

    /// Removes a command by canonical name. Unknown names are a no-op and
    /// return `None`.
    pub fn remove_command(&self, name: &str) -> Option<Arc<Command>> {
        let removed = self.registry_mut().remove(name);
        if removed.is_some() {
            debug!("[BOT] Removed command '{}'", name);
        }
        removed
    }

    pub fn command(&self, token: &str) -> Option<Arc<Command>> {
        self.registry().resolve(token)
    }

    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.registry().list()
    }

    // ------------------------------------------------------------------
    // Cogs and extensions
    // ------------------------------------------------------------------

    pub fn add_cog(&self, cog: Arc<dyn Cog>) -> Result<(), FrameworkError> {
        let name = cog.name().to_string();
        let mut cogs = self.cogs();
        if cogs.contains_key(&name) {
            return Err(FrameworkError::DuplicateCog(name));
        }
        info!("[COG] Added cog '{}'", name);
        cogs.insert(name, cog);
        Ok(())
    }

    /// Runs the cog's teardown hook, then drops it from the cog registry.
    pub fn unload_cog(&self, name: &str) -> Result<(), FrameworkError> {
        let cog = self
            .cogs()
            .get(name)
            .cloned()
            .ok_or_else(|| FrameworkError::CogNotFound(name.to_string()))?;

        cog.unload(self);
        self.cogs().remove(name);
        info!("[COG] Unloaded cog '{}'", name);
        Ok(())
    }

    pub fn cog_names(&self) -> Vec<String> {
        self.cogs().keys().cloned().collect()
    }

    /// Runs the setup function registered for `id`.
    ///
    /// A setup that fails partway is rolled back: every command and cog it
    /// added is removed again before the error is returned.
    pub fn load_extension(&self, id: &str) -> Result<(), LoadError> {
        let setup = self
            .loader
            .entry_point(id)
            .ok_or_else(|| LoadError::NoEntryPoint(id.to_string()))?;

        let commands_before: HashSet<String> =
            self.commands().iter().map(|c| c.name().to_string()).collect();
        let cogs_before: HashSet<String> = self.cog_names().into_iter().collect();

        if let Err(source) = setup(self) {
            for command in self.commands() {
                if !commands_before.contains(command.name()) {
                    self.remove_command(command.name());
                }
            }
            self.cogs().retain(|name, _| cogs_before.contains(name));
            warn!("[COG] Extension '{}' failed to load and was rolled back: {}", id, source);
            return Err(LoadError::Setup {
                module: id.to_string(),
                source,
            });
        }

        info!("[COG] Loaded extension '{}'", id);
        Ok(())
    }

    pub fn extension_ids(&self) -> Vec<String> {
        self.loader.ids().map(str::to_string).collect()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Resolves, invokes and contains one command invocation.
    ///
    /// Messages without a matching prefix, or whose first token names no
    /// command, are ignored silently. Any failure once a command is resolved
    /// (cooldown, handler error, panic) goes to the error hook and is reported
    /// as `Dispatch::Failed`.
    pub async fn dispatch(self: &Arc<Self>, message: InboundMessage) -> Dispatch {
        let prefixes = self.prefix.resolve(self, &message).await;

        let Some((prefix, rest)) = strip_prefix(&message.content, &prefixes) else {
            return Dispatch::NoPrefix;
        };
        let prefix = prefix.to_string();

        let mut tokens = tokenize(rest).into_iter();
        let invoker = tokens.next().unwrap_or_default();
        let args: Vec<String> = tokens.collect();

        let Some(command) = self.command(&invoker) else {
            debug!("[DISPATCH] No command named '{}'", invoker);
            return Dispatch::UnknownCommand { invoker };
        };

        info!("[DISPATCH] {} ({}) invoked '{}' as '{}{}' with {} args",
            message.author.name, message.author.id, command.name(), prefix, invoker, args.len());

        let name = command.name().to_string();
        let ctx = Context::new(Arc::new(message), self.clone(), command.clone(), prefix, invoker, args);

        let result = match AssertUnwindSafe(command.invoke(ctx.clone())).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(CommandError::Panicked(panic_message(payload.as_ref()))),
        };

        match result {
            Ok(()) => Dispatch::Completed { command: name },
            Err(e) => {
                warn!("[DISPATCH] Command '{}' failed for {} ({}): {}",
                    name, ctx.author().name, ctx.author().id, e);
                self.error_hook.on_command_error(&ctx, &e).await;
                Dispatch::Failed { command: name }
            }
        }
    }

    fn registry(&self) -> RwLockReadGuard<'_, CommandRegistry> {
        self.commands.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, CommandRegistry> {
        self.commands.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn cogs(&self) -> MutexGuard<'_, BTreeMap<String, Arc<dyn Cog>>> {
        self.cogs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Default)]
pub struct BotBuilder {
    prefix: Prefix,
    loader: ModuleLoader,
    error_hook: Option<Arc<dyn ErrorHook>>,
}

impl BotBuilder {
    pub fn prefix(mut self, prefix: impl Into<Prefix>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Makes an extension loadable under `id`.
    pub fn extension(mut self, id: impl Into<String>, setup: SetupFn) -> Self {
        self.loader.register(id, setup);
        self
    }

    /// Replaces the default [`ReportError`] hook.
    pub fn on_error(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error_hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Arc<Bot> {
        Arc::new(Bot {
            prefix: self.prefix,
            commands: RwLock::new(CommandRegistry::new()),
            cogs: Mutex::new(BTreeMap::new()),
            loader: self.loader,
            error_hook: self.error_hook.unwrap_or_else(|| Arc::new(ReportError)),
        })
    }
}
