// help.rs - Help Command Module
// Lists every registered command with its aliases and description

use crate::framework::{Command, Context, HandlerResult};

pub fn command() -> Command {
    Command::new("help", help)
        .aliases(["h", "commands"])
        .description("Show this help message")
}

/// Display help information for all available commands
pub async fn help(ctx: Context, _args: Vec<String>) -> HandlerResult {
    let prefix = ctx.prefix();
    let mut help_text = String::from("**🤖 Command Help**\n\n");

    for command in ctx.bot().commands() {
        help_text.push_str(&format!("• `{}{}`", prefix, command.name()));
        if !command.about().is_empty() {
            help_text.push_str(&format!(" - {}", command.about()));
        }
        if !command.alias_list().is_empty() {
            let aliases: Vec<String> = command
                .alias_list()
                .iter()
                .map(|a| format!("`{}{}`", prefix, a))
                .collect();
            help_text.push_str(&format!("\n  **Aliases:** {}", aliases.join(", ")));
        }
        help_text.push('\n');
    }

    ctx.send(help_text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::context::testing::{message, RecordingChannel};
    use crate::framework::Bot;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_help_lists_commands_with_matched_prefix() {
        let bot = Bot::builder().prefix(vec!["^".to_string(), "!".to_string()]).build();
        bot.add_command(command()).unwrap();
        bot.add_command(crate::commands::ping::command()).unwrap();
        let channel = Arc::new(RecordingChannel::default());

        bot.dispatch(message("!h", 1, channel.clone())).await;
        let sent = channel.sent();
        assert_eq!(sent.len(), 1);

        let text = &sent[0];
        assert!(text.contains("• `!help` - Show this help message"));
        assert!(text.contains("**Aliases:** `!h`, `!commands`"));
        assert!(text.contains("• `!ping` - Test bot connectivity"));
        assert!(text.find("`!help`").unwrap() < text.find("`!ping`").unwrap());
    }
}
