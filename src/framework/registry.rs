// registry.rs - Command lookup table
// Maps every invocation token (name or alias) to its command, and keeps
// canonical names in insertion order for listing.

use std::collections::HashMap;
use std::sync::Arc;

use super::command::Command;
use super::error::FrameworkError;

#[derive(Debug, Default)]
pub struct CommandRegistry {
    by_token: HashMap<String, Arc<Command>>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under its name and every alias.
    ///
    /// Fails with `DuplicateCommand` if any of those tokens is already taken,
    /// in which case the registry is left untouched.
    pub fn add(&mut self, command: impl Into<Arc<Command>>) -> Result<(), FrameworkError> {
        let command = command.into();

        if let Some(taken) = command.keys().find(|key| self.by_token.contains_key(*key)) {
            return Err(FrameworkError::DuplicateCommand(taken.to_string()));
        }

        for key in command.keys() {
            self.by_token.insert(key.to_string(), command.clone());
        }
        self.order.push(command.name().to_string());
        Ok(())
    }

    /// Removes the command whose canonical name is `name`, along with all of
    /// its aliases. Absent names (including aliases) are a no-op returning
    /// `None`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<Command>> {
        let command = match self.by_token.get(name) {
            Some(command) if command.name() == name => command.clone(),
            _ => return None,
        };

        for key in command.keys() {
            self.by_token.remove(key);
        }
        self.order.retain(|n| n != name);
        Some(command)
    }

    /// Exact-match lookup by name or alias.
    pub fn resolve(&self, token: &str) -> Option<Arc<Command>> {
        self.by_token.get(token).cloned()
    }

    /// Registered commands in the order they were added.
    pub fn list(&self) -> Vec<Arc<Command>> {
        self.order
            .iter()
            .filter_map(|name| self.by_token.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
