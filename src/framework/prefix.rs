// prefix.rs - Prefix configuration and matching

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::bot::Bot;
use super::context::InboundMessage;

/// Computes the prefixes that apply to a given message, e.g. per guild.
#[async_trait]
pub trait PrefixResolver: Send + Sync {
    async fn prefixes(&self, bot: &Bot, message: &InboundMessage) -> Vec<String>;
}

/// Synchronous closures work as resolvers directly.
#[async_trait]
impl<F> PrefixResolver for F
where
    F: Fn(&Bot, &InboundMessage) -> Vec<String> + Send + Sync,
{
    async fn prefixes(&self, bot: &Bot, message: &InboundMessage) -> Vec<String> {
        self(bot, message)
    }
}

#[derive(Clone)]
pub enum Prefix {
    Literal(String),
    /// Tried in order; the first one the message starts with wins.
    List(Vec<String>),
    Dynamic(Arc<dyn PrefixResolver>),
}

impl Prefix {
    pub fn dynamic(resolver: impl PrefixResolver + 'static) -> Self {
        Prefix::Dynamic(Arc::new(resolver))
    }

    /// The active prefix set for `message`, in match order.
    pub async fn resolve(&self, bot: &Bot, message: &InboundMessage) -> Vec<String> {
        match self {
            Prefix::Literal(prefix) => vec![prefix.clone()],
            Prefix::List(prefixes) => prefixes.clone(),
            Prefix::Dynamic(resolver) => resolver.prefixes(bot, message).await,
        }
    }
}

impl Default for Prefix {
    fn default() -> Self {
        Prefix::Literal("!".to_string())
    }
}

impl From<&str> for Prefix {
    fn from(prefix: &str) -> Self {
        Prefix::Literal(prefix.to_string())
    }
}

impl From<Vec<String>> for Prefix {
    fn from(prefixes: Vec<String>) -> Self {
        Prefix::List(prefixes)
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Literal(p) => f.debug_tuple("Literal").field(p).finish(),
            Prefix::List(ps) => f.debug_tuple("List").field(ps).finish(),
            Prefix::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Returns the first prefix in `prefixes` that `content` starts with, and the
/// text left after removing exactly that prefix.
///
/// First match wins, not longest match: with `["!", "!!"]`, `"!!roll"` matches
/// `"!"` and leaves `"!roll"`.
pub fn strip_prefix<'a>(content: &'a str, prefixes: &'a [String]) -> Option<(&'a str, &'a str)> {
    prefixes
        .iter()
        .find_map(|p| content.strip_prefix(p.as_str()).map(|rest| (p.as_str(), rest)))
}

/// Splits on every single space. Consecutive spaces yield empty tokens and
/// an empty input yields one empty token; no quoting or escaping.
pub fn tokenize(content: &str) -> Vec<String> {
    content.split(' ').map(str::to_string).collect()
}
