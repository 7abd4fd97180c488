// commands/mod.rs - Command Module Registry
// This file declares all command modules and the extension entry points
// main.rs links into the bot

pub mod echo;           // Echo command for testing
pub mod fun;            // Dice, coin flips and random pictures
pub mod help;           // Help system listing every registered command
pub mod ping;           // Basic ping/pong functionality

use std::sync::Arc;

use crate::framework::{Bot, BotBuilder, Cog, FrameworkError};

/// Basic utility commands.
pub struct General;

impl Cog for General {
    fn unload(&self, bot: &Bot) {
        for name in ["ping", "echo", "help"] {
            bot.remove_command(name);
        }
    }
}

/// Extension entry point for the `General` cog.
pub fn setup_general(bot: &Bot) -> Result<(), FrameworkError> {
    bot.add_command(ping::command())?;
    bot.add_command(echo::command())?;
    bot.add_command(help::command())?;
    bot.add_cog(Arc::new(General))
}

/// Registers every bundled extension with the builder.
pub fn register_extensions(builder: BotBuilder) -> BotBuilder {
    builder
        .extension("general", setup_general)
        .extension("fun", fun::setup)
}
