// transport.rs - serenity binding
// Turns Discord message events into InboundMessages and hands them to the
// bot. Replies go out through ChannelId::say on the channel they came from.

use std::sync::Arc;

use log::{debug, info};
use serenity::{
    async_trait,
    client::{Context as SerenityContext, EventHandler},
    http::Http,
    model::{channel::Message, gateway::Ready, id::ChannelId},
};

use crate::framework::{Author, Bot, Dispatch, HandlerResult, InboundMessage, ReplyChannel};

/// Reply capability bound to one Discord channel.
pub struct SerenityChannel {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl SerenityChannel {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl ReplyChannel for SerenityChannel {
    async fn send(&self, content: &str) -> HandlerResult {
        self.channel_id.say(&self.http, content).await?;
        Ok(())
    }
}

/// Converts a serenity message into the framework's transport-neutral form.
pub fn inbound_message(http: Arc<Http>, msg: &Message) -> InboundMessage {
    InboundMessage {
        content: msg.content.clone(),
        author: Author {
            id: msg.author.id.0,
            name: msg.author.name.clone(),
        },
        channel_id: msg.channel_id.0,
        guild_id: msg.guild_id.map(|guild| guild.0),
        reply: Arc::new(SerenityChannel::new(http, msg.channel_id)),
    }
}

// Event handler implementation
pub struct Handler {
    bot: Arc<Bot>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: SerenityContext, ready: Ready) {
        info!("✅ Bot connected as {}! ({} guilds)", ready.user.name, ready.guilds.len());
    }

    async fn message(&self, ctx: SerenityContext, msg: Message) {
        // Never react to bots, including ourselves
        if msg.author.bot {
            return;
        }

        let inbound = inbound_message(ctx.http.clone(), &msg);
        match self.bot.dispatch(inbound).await {
            Dispatch::NoPrefix => {}
            outcome => debug!("[TRANSPORT] Message {} from {}: {:?}", msg.id, msg.author.name, outcome),
        }
    }
}
