use std::sync::Arc;

use k3bot::commands;
use k3bot::config::{load_bot_config, BotConfig};
use k3bot::framework::Bot;
use k3bot::transport::Handler;
use serenity::{client::Client, prelude::GatewayIntents};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

// Operator console on stdin: lets whoever runs the process inspect the bot,
// load and unload extensions, and stop it gracefully
async fn handle_command_line(bot: Arc<Bot>, shutdown_tx: mpsc::Sender<String>) {
    use tokio::time::{sleep, Duration};

    println!("📝 Command line interface active. Type 'help' for available commands.");

    // Wait for bot to connect and show connection messages before showing prompt
    sleep(Duration::from_millis(1500)).await;

    let mut reader = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        if stdout.write_all(b"> ").await.is_err() || stdout.flush().await.is_err() {
            eprintln!("❌ Failed to write prompt");
            break;
        }

        let line = match reader.next_line().await {
            Ok(Some(line)) => line,
            // EOF reached
            Ok(None) => break,
            Err(e) => {
                eprintln!("❌ Error reading command line: {}", e);
                break;
            }
        };

        let line = line.trim();
        let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
        let argument = argument.trim();

        match command.to_lowercase().as_str() {
            "quit" | "q" | "exit" => {
                println!("⏹️  Shutting down bot...");
                if shutdown_tx.send("quit".to_string()).await.is_err() {
                    eprintln!("❌ Failed to send shutdown signal");
                }
                break;
            }
            "help" | "h" => {
                println!("🤖 Available commands:");
                println!("  quit, q, exit  - Stop the bot gracefully");
                println!("  help, h        - Show this help message");
                println!("  status         - Show bot status");
                println!("  commands       - List registered chat commands");
                println!("  cogs           - List loaded cogs");
                println!("  load <id>      - Load an extension");
                println!("  unload <cog>   - Unload a cog");
            }
            "status" => {
                println!("🤖 Bot Status: Running");
                println!("🔑 Prefix: {:?}", bot.prefix());
                println!("📦 Cogs loaded: {}", bot.cog_names().len());
                println!("💬 Commands registered: {}", bot.commands().len());
            }
            "commands" => {
                for command in bot.commands() {
                    println!("  {} {:?}", command.name(), command.alias_list());
                }
            }
            "cogs" => {
                println!("📦 Loaded: {}", bot.cog_names().join(", "));
                println!("🧩 Available extensions: {}", bot.extension_ids().join(", "));
            }
            "load" => match bot.load_extension(argument) {
                Ok(()) => println!("✅ Loaded extension '{}'", argument),
                Err(e) => println!("❌ {}", e),
            },
            "unload" => match bot.unload_cog(argument) {
                Ok(()) => println!("✅ Unloaded cog '{}'", argument),
                Err(e) => println!("❌ {}", e),
            },
            "" => {
                // Empty line, do nothing
            }
            other => {
                println!("❓ Unknown command: '{}'. Type 'help' for available commands.", other);
            }
        }
    }
}

fn build_bot(config: &BotConfig) -> Result<Arc<Bot>, k3bot::framework::LoadError> {
    let bot = commands::register_extensions(Bot::builder().prefix(config.prefix())).build();
    for extension in &config.extensions {
        bot.load_extension(extension)?;
    }
    Ok(bot)
}

#[tokio::main]
async fn main() {
    // Load configuration from botconfig.txt file
    let config = match load_bot_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("❌ Failed to load botconfig.txt: {}", error);
            eprintln!("Create a botconfig.txt file in the project root with: DISCORD_TOKEN=your_token_here and PREFIX=!");
            return;
        }
    };

    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str()))
        .format_timestamp_secs()
        .init();

    log::info!("🤖 Starting bot with prefixes {:?}", config.prefixes);

    let bot = match build_bot(&config) {
        Ok(bot) => bot,
        Err(e) => {
            log::error!("❌ Failed to load extensions: {}", e);
            return;
        }
    };

    // Configure bot intents
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    // Create and start client
    let mut client = match Client::builder(&config.token, intents)
        .event_handler(Handler::new(bot.clone()))
        .await
    {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("Check your token in botconfig.txt file");
            return;
        }
    };

    // Set up command line interface for graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);
    let cmd_task = tokio::spawn(handle_command_line(bot.clone(), shutdown_tx));

    println!("🚀 Bot is running...");
    println!("💡 Use 'quit' command to stop gracefully, or press Ctrl+C");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        shutdown_signal = shutdown_rx.recv() => {
            if let Some(signal) = shutdown_signal {
                println!("📡 Received '{}' command, stopping bot gracefully...", signal);
            }
        }
        result = client.start() => {
            if let Err(why) = result {
                log::error!("❌ Client error: {:?}", why);
            }
        }
    }

    client.shard_manager.lock().await.shutdown_all().await;

    // Stop the command line task
    cmd_task.abort();

    for cog in bot.cog_names() {
        if let Err(e) = bot.unload_cog(&cog) {
            log::warn!("⚠️  Failed to unload cog '{}': {}", cog, e);
        }
    }

    println!("✅ Bot stopped");
}
