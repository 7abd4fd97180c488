// loader.rs - Extension setup table
// Replaces import-by-name: the embedding application links each extension's
// setup function into the table at build time, and `Bot::load_extension`
// looks it up by identifier.

use std::collections::BTreeMap;

use super::bot::Bot;
use super::error::FrameworkError;

/// Entry point of an extension. Registers commands and cogs into the bot.
pub type SetupFn = fn(&Bot) -> Result<(), FrameworkError>;

#[derive(Default, Clone)]
pub struct ModuleLoader {
    entries: BTreeMap<String, SetupFn>,
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `setup` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, setup: SetupFn) {
        self.entries.insert(id.into(), setup);
    }

    pub fn entry_point(&self, id: &str) -> Option<SetupFn> {
        self.entries.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
