// cog.rs - Loadable bundles of commands

use super::bot::Bot;

/// A named group of commands with a teardown hook.
///
/// A cog registers its own commands when it is set up, and is responsible
/// for removing them again in [`Cog::unload`].
pub trait Cog: Send + Sync {
    /// Key in the bot's cog registry. Defaults to the type's short name.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called by [`Bot::unload_cog`] before the cog is dropped from the registry.
    fn unload(&self, _bot: &Bot) {}
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
