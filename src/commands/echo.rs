// echo.rs - Echo Command Module
// This module implements the echo command, which simply repeats back user input for testing purposes.
//
// Key Features:
// - Echoes user-provided text
// - Provides usage guidance if no text is given
//
// Used by: commands/mod.rs (General cog)

use crate::framework::{Command, Context, HandlerResult};

pub fn command() -> Command {
    Command::new("echo", echo)
        .alias("say")
        .description("Echo back your message")
}

/// Main echo command handler
/// Echoes back the user's input text
pub async fn echo(ctx: Context, args: Vec<String>) -> HandlerResult {
    // Tokens were split on single spaces, so joining restores the text exactly
    let text = args.join(" ");

    // If no text is provided, reply with usage guidance
    if text.trim().is_empty() {
        ctx.send("Please provide text to echo!").await
    } else {
        ctx.send(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::context::testing::{message, RecordingChannel};
    use crate::framework::Bot;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_echo_restores_spacing() {
        let bot = Bot::builder().prefix("!").build();
        bot.add_command(command()).unwrap();
        let channel = Arc::new(RecordingChannel::default());

        bot.dispatch(message("!say hello   world ", 1, channel.clone())).await;
        assert_eq!(channel.sent(), vec!["hello   world ".to_string()]);
    }

    #[tokio::test]
    async fn test_echo_without_text_gives_usage() {
        let bot = Bot::builder().prefix("!").build();
        bot.add_command(command()).unwrap();
        let channel = Arc::new(RecordingChannel::default());

        bot.dispatch(message("!echo", 1, channel.clone())).await;
        bot.dispatch(message("!echo   ", 1, channel.clone())).await;
        assert_eq!(channel.sent(), vec!["Please provide text to echo!".to_string(); 2]);
    }
}
