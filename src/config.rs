// config.rs - Bot configuration loader
// Reads botconfig.txt (KEY=VALUE lines) from the first of several candidate
// locations. DISCORD_TOKEN and PREFIX may be overridden by environment
// variables of the same name.

use std::collections::HashMap;
use std::env;
use std::fs;

use log::debug;
use thiserror::Error;

use crate::framework::Prefix;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";
const DEFAULT_PREFIX: &str = "!";
const DEFAULT_EXTENSIONS: &str = "general,fun";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no botconfig.txt file found in any expected location (., .., ../.., src/)")]
    NotFound,

    #[error("DISCORD_TOKEN not found in botconfig.txt")]
    MissingToken,

    #[error("DISCORD_TOKEN in botconfig.txt is set to a placeholder value")]
    PlaceholderToken,

    #[error("PREFIX must contain at least one non-empty prefix")]
    EmptyPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub token: String,
    /// In match order. One entry means a literal prefix.
    pub prefixes: Vec<String>,
    /// Extension identifiers to load at startup.
    pub extensions: Vec<String>,
    pub log_filter: String,
}

impl BotConfig {
    pub fn prefix(&self) -> Prefix {
        match self.prefixes.as_slice() {
            [single] => Prefix::Literal(single.clone()),
            many => Prefix::List(many.to_vec()),
        }
    }
}

/// Parses KEY=VALUE lines. Blank lines and `#` comments are skipped and a
/// leading BOM is tolerated.
pub fn parse_pairs(content: &str) -> HashMap<String, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut pairs = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            pairs.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    pairs
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a config from parsed pairs.
pub fn from_pairs(pairs: &HashMap<String, String>) -> Result<BotConfig, ConfigError> {
    let token = pairs.get("DISCORD_TOKEN").ok_or(ConfigError::MissingToken)?.clone();
    if token.is_empty() || token == TOKEN_PLACEHOLDER {
        return Err(ConfigError::PlaceholderToken);
    }

    let prefixes = split_list(pairs.get("PREFIX").map(String::as_str).unwrap_or(DEFAULT_PREFIX));
    if prefixes.is_empty() {
        return Err(ConfigError::EmptyPrefix);
    }

    let extensions = split_list(pairs.get("EXTENSIONS").map(String::as_str).unwrap_or(DEFAULT_EXTENSIONS));
    let log_filter = pairs
        .get("RUST_LOG")
        .cloned()
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    Ok(BotConfig { token, prefixes, extensions, log_filter })
}

pub fn parse_config(content: &str) -> Result<BotConfig, ConfigError> {
    from_pairs(&parse_pairs(content))
}

/// Loads botconfig.txt from the first location that exists, then applies
/// environment overrides.
pub fn load_bot_config() -> Result<BotConfig, ConfigError> {
    for config_path in &CONFIG_PATHS {
        let Ok(content) = fs::read_to_string(config_path) else {
            // Try next path
            continue;
        };

        debug!("[CONFIG] Using {}", config_path);
        let mut pairs = parse_pairs(&content);
        for key in ["DISCORD_TOKEN", "PREFIX"] {
            if let Ok(value) = env::var(key) {
                pairs.insert(key.to_string(), value);
            }
        }
        return from_pairs(&pairs);
    }

    Err(ConfigError::NotFound)
}
