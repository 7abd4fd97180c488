// ping.rs - Ping Command Module
// This module implements the ping command, which measures and displays the bot's response time.
//
// Key Features:
// - Measures round-trip latency of a reply through the transport
// - Provides immediate feedback to users
//
// Used by: commands/mod.rs (General cog)

use std::time::Instant;

use log::debug;

use crate::framework::{Command, Context, HandlerResult};

pub fn command() -> Command {
    Command::new("ping", ping).description("Test bot connectivity and response time")
}

/// Main ping command handler
/// Sends a first reply, then a second one carrying how long the first took
pub async fn ping(ctx: Context, _args: Vec<String>) -> HandlerResult {
    let start_time = Instant::now();

    // Send the initial response and measure the time
    ctx.send("Pong! 🏓").await?;
    let ping_ms = start_time.elapsed().as_millis();

    debug!("[PING] Reply to channel {} took {}ms", ctx.channel_id(), ping_ms);
    ctx.send(format!("Response time: {}ms", ping_ms)).await
}
