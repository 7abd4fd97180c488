// fun.rs - Fun Command Module
// Commands that invoke random things: dice rolls, coin flips and random
// animal pictures fetched from public APIs.
//
// Key Features:
// - D&D style dice rolling (`roll 2d6 1d20`)
// - Coin flips
// - Random dog/cat/bird/fox/kemonomimi images and random words
// - Every command shares a 6-per-12-seconds cooldown per user
//
// Used by: main.rs (registered as the `fun` extension)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;

use crate::framework::{
    Bot, Cog, Command, CommandHandler, Context, FrameworkError, HandlerError, HandlerResult,
};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const MAX_ROLLS: usize = 20;
pub const MAX_ROLL_SIZE: u32 = 30;
pub const MAX_DIE_SIZE: u32 = 2000;

const COOLDOWN_RATE: u32 = 6;
const COOLDOWN_PER: Duration = Duration::from_secs(12);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
// Reddit refuses requests without a descriptive User-Agent
const USER_AGENT: &str = concat!("k3bot/", env!("CARGO_PKG_VERSION"), " (Discord chat bot)");

const URL_RANDOM_WORD_API: &str = "http://setgetgo.com/randomword/get.php";
const URL_RANDOM_DOG_API: &str = "https://random.dog/woof.json";
const URL_RANDOM_CAT_API: &str = "https://random.cat/meow";
const URL_RANDOM_BIRB: &str = "https://random.birb.pw/img/";
const URL_RANDOM_BIRB_API: &str = "https://random.birb.pw/tweet.json/";
const URL_RANDOM_NEKO_API: &str = "https://nekos.life/api/neko";
const URL_FOX_SUBREDDIT_TOP_API: &str = "https://www.reddit.com/r/foxes/top/.json";
const URL_FOX_SUBREDDIT_NEW_API: &str = "https://www.reddit.com/r/foxes/new/.json";

static DICE_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+[dD][0-9]+$").expect("Invalid dice expression regex pattern")
});

/// Names of every command this cog registers, removed again on unload.
const COMMANDS: &[&str] = &["roll", "coin", "dog", "cat", "kemono", "birb", "fox", "rwg"];

// ============================================================================
// DICE
// ============================================================================

/// Caps applied by [`parse_rolls`].
#[derive(Debug, Clone, Copy)]
pub struct RollLimits {
    /// Expressions past this many are ignored.
    pub max_rolls: usize,
    /// Most dice allowed in a single expression.
    pub max_roll_size: u32,
    /// Most sides allowed on a die.
    pub max_die_size: u32,
}

impl Default for RollLimits {
    fn default() -> Self {
        Self {
            max_rolls: MAX_ROLLS,
            max_roll_size: MAX_ROLL_SIZE,
            max_die_size: MAX_DIE_SIZE,
        }
    }
}

/// Parses an `NdM` expression into `(dice, sides)`.
///
/// Returns `None` unless the whole string is digits, `d` or `D`, digits, and
/// both numbers fit in a `u32`.
pub fn parse_roll(expression: &str) -> Option<(u32, u32)> {
    if !DICE_EXPRESSION.is_match(expression) {
        return None;
    }
    let (count, size) = expression.split_once(['d', 'D'])?;
    Some((count.parse().ok()?, size.parse().ok()?))
}

/// Rolls `die_count` dice with `die_size` sides each. Zero-sided dice roll
/// nothing.
pub fn generate_roll(die_count: u32, die_size: u32) -> Vec<u32> {
    if die_size == 0 {
        return Vec::new();
    }
    let mut rng = rand::thread_rng();
    (0..die_count).map(|_| rng.gen_range(1..=die_size)).collect()
}

/// Keeps only well-formed dice expressions.
pub fn trim_expressions<'a>(expressions: &'a [String]) -> Vec<&'a str> {
    expressions
        .iter()
        .map(String::as_str)
        .filter(|e| DICE_EXPRESSION.is_match(e))
        .collect()
}

/// Rolls every valid expression and formats one line per roll, e.g.
/// `"2d6: [3, 5] (8)"`. Rolls over the limits, with no dice, or with dice of
/// fewer than two sides are skipped.
pub fn parse_rolls(expressions: &[String], limits: RollLimits) -> Vec<String> {
    let mut rolls = Vec::new();

    for expression in trim_expressions(expressions).into_iter().take(limits.max_rolls) {
        let Some((count, size)) = parse_roll(expression) else {
            continue;
        };

        if count > limits.max_roll_size || size > limits.max_die_size {
            continue;
        }
        if size > 1 && count >= 1 {
            let outcome = generate_roll(count, size);
            let total: u32 = outcome.iter().sum();
            rolls.push(format!("{}: {:?} ({})", expression, outcome, total));
        }
    }

    rolls
}

fn codeblock(text: &str) -> String {
    format!("```\n{}\n```", text)
}

/// Roll some dice, using D&D syntax.
/// Supports:
///   - roll 5d6 - Roll five six sided dice.
///   - roll 1d20 2d8 - Roll one twenty sided die, and two eight sided dice.
pub async fn roll(ctx: Context, expressions: Vec<String>) -> HandlerResult {
    let rolls = parse_rolls(&expressions, RollLimits::default());

    if rolls.is_empty() {
        ctx.send(format!(
            "No valid rolls supplied. Please use D&D format, e.g. 5d6.\n\
            Individual rolls cannot have more than {} dice, and dice cannot have more than {} sides.",
            MAX_ROLL_SIZE, MAX_DIE_SIZE
        ))
        .await
    } else {
        ctx.send(codeblock(&rolls.join("\n"))).await
    }
}

/// Flip a coin.
pub async fn coin(ctx: Context, _args: Vec<String>) -> HandlerResult {
    let choice = if rand::thread_rng().gen_bool(0.5) { "Heads!" } else { "Tails!" };
    ctx.send(choice).await
}

// ============================================================================
// RANDOM IMAGE / WORD FETCHERS
// ============================================================================

#[derive(Deserialize)]
struct DogResponse {
    url: String,
}

#[derive(Deserialize)]
struct CatResponse {
    file: String,
}

#[derive(Deserialize)]
struct NekoResponse {
    neko: String,
}

#[derive(Deserialize)]
struct BirbResponse {
    file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Dog,
    Cat,
    Neko,
    Birb,
    Fox,
    Word,
}

impl Source {
    fn unreachable_message(self) -> &'static str {
        match self {
            Source::Dog => "Could not reach random.dog. :<",
            Source::Cat => "Could not reach random.cat. :<",
            Source::Neko => "Could not reach nekos.life. :<",
            Source::Birb => "Could not reach random.birb.pw. :<",
            Source::Fox => "Could not reach Reddit. :<",
            Source::Word => "Could not reach API. x.x",
        }
    }
}

/// Handler for every command that answers with something fetched over HTTP.
struct Fetcher {
    http: reqwest::Client,
    source: Source,
}

impl Fetcher {
    /// `Ok(None)` when the API answered with a non-success status.
    async fn fetch(&self) -> Result<Option<String>, HandlerError> {
        let url = match self.source {
            Source::Dog => URL_RANDOM_DOG_API,
            Source::Cat => URL_RANDOM_CAT_API,
            Source::Neko => URL_RANDOM_NEKO_API,
            Source::Birb => URL_RANDOM_BIRB_API,
            Source::Word => URL_RANDOM_WORD_API,
            Source::Fox => {
                let choices = [URL_FOX_SUBREDDIT_TOP_API, URL_FOX_SUBREDDIT_NEW_API];
                choices.choose(&mut rand::thread_rng()).copied().unwrap_or(URL_FOX_SUBREDDIT_TOP_API)
            }
        };

        debug!("[FUN] Fetching {:?} from {}", self.source, url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            warn!("[FUN] {} answered with HTTP {}", url, response.status());
            return Ok(None);
        }

        let reply = match self.source {
            Source::Dog => response.json::<DogResponse>().await?.url,
            Source::Cat => response.json::<CatResponse>().await?.file,
            Source::Neko => response.json::<NekoResponse>().await?.neko,
            Source::Birb => format!("{}{}", URL_RANDOM_BIRB, response.json::<BirbResponse>().await?.file),
            Source::Word => response.text().await?,
            Source::Fox => {
                let listing: serde_json::Value = response.json().await?;
                match pick_reddit_url(&listing) {
                    Some(url) => format!("{}\nPowered by Reddit", url),
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(reply))
    }
}

#[async_trait]
impl CommandHandler for Fetcher {
    async fn call(&self, ctx: Context, _args: Vec<String>) -> HandlerResult {
        let reply = self.fetch().await?;
        let reply = reply.unwrap_or_else(|| self.source.unreachable_message().to_string());
        ctx.send(reply).await
    }
}

/// Picks a random post URL out of a subreddit listing.
fn pick_reddit_url(listing: &serde_json::Value) -> Option<String> {
    let children = listing["data"]["children"].as_array()?;
    let post = children.choose(&mut rand::thread_rng())?;
    post["data"]["url"].as_str().map(str::to_string)
}

// ============================================================================
// COG
// ============================================================================

pub struct Fun;

impl Cog for Fun {
    fn unload(&self, bot: &Bot) {
        for name in COMMANDS {
            bot.remove_command(name);
        }
    }
}

fn fetch_command(name: &str, http: &reqwest::Client, source: Source) -> Command {
    let handler = Arc::new(Fetcher { http: http.clone(), source });
    Command::with_handler(name, handler)
}

fn http_client() -> Result<reqwest::Client, FrameworkError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| FrameworkError::Setup(format!("could not build HTTP client: {}", e)))
}

/// Extension entry point: registers the fun commands and the `Fun` cog.
pub fn setup(bot: &Bot) -> Result<(), FrameworkError> {
    let http = http_client()?;

    let commands = vec![
        Command::new("roll", roll).description("Roll some dice using D&D syntax, e.g. `roll 1d20 2d8`"),
        Command::new("coin", coin)
            .aliases(["cflip", "coinflip"])
            .description("Flip a coin"),
        fetch_command("dog", &http, Source::Dog)
            .alias("doge")
            .description("Fetch a random dog"),
        fetch_command("cat", &http, Source::Cat)
            .alias("feline")
            .description("Fetch a random cat"),
        fetch_command("kemono", &http, Source::Neko)
            .aliases(["kemonomimi", "catgirl", "neko", "nekomimi", "foxgirl", "kitsunemimi"])
            .description("Fetch a random animal-eared person"),
        fetch_command("birb", &http, Source::Birb).description("Fetch a random birb"),
        fetch_command("fox", &http, Source::Fox)
            .alias("kitsune")
            .description("Fetch a random fox"),
        fetch_command("rwg", &http, Source::Word)
            .aliases(["rword", "randword"])
            .description("Randomly generate a word"),
    ];

    for command in commands {
        bot.add_command(command.cooldown(COOLDOWN_RATE, COOLDOWN_PER))?;
    }
    bot.add_cog(Arc::new(Fun))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::context::testing::{message, RecordingChannel};
    use crate::framework::Dispatch;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_roll() {
        assert_eq!(parse_roll("3d6"), Some((3, 6)));
        assert_eq!(parse_roll("10D20"), Some((10, 20)));
        assert_eq!(parse_roll("d6"), None);
        assert_eq!(parse_roll("3d"), None);
        assert_eq!(parse_roll("3d6+1"), None);
        assert_eq!(parse_roll(" 3d6"), None);
        assert_eq!(parse_roll("99999999999d6"), None);
    }

    #[test]
    fn test_generate_roll_stays_in_range() {
        let outcome = generate_roll(3, 6);
        assert_eq!(outcome.len(), 3);
        assert!(outcome.iter().all(|v| (1..=6).contains(v)), "out of range: {:?}", outcome);

        assert!(generate_roll(0, 6).is_empty());
        assert_eq!(generate_roll(5, 1), vec![1; 5]);
        assert!(generate_roll(5, 0).is_empty());
    }

    #[test]
    fn test_trim_expressions() {
        let input = strings(&["2d6", "", "banana", "1d20", "4x4", "3D8"]);
        assert_eq!(trim_expressions(&input), vec!["2d6", "1d20", "3D8"]);
    }

    #[test]
    fn test_parse_rolls_formats_and_filters() {
        let input = strings(&["2d6", "1d1", "0d6", "31d6", "1d2001", "oops", "1d20"]);
        let rolls = parse_rolls(&input, RollLimits::default());

        assert_eq!(rolls.len(), 2);
        assert!(rolls[0].starts_with("2d6: ["));
        assert!(rolls[1].starts_with("1d20: ["));

        let (_, total) = rolls[0].rsplit_once(" (").unwrap();
        let total: u32 = total.trim_end_matches(')').parse().unwrap();
        assert!((2..=12).contains(&total));
    }

    #[test]
    fn test_parse_rolls_caps_number_of_expressions() {
        let input = vec!["1d6".to_string(); 25];
        assert_eq!(parse_rolls(&input, RollLimits::default()).len(), MAX_ROLLS);

        let limits = RollLimits { max_rolls: 2, ..RollLimits::default() };
        assert_eq!(parse_rolls(&input, limits).len(), 2);
    }

    #[test]
    fn test_pick_reddit_url() {
        let listing = serde_json::json!({
            "data": { "children": [ { "data": { "url": "https://i.redd.it/fox.jpg" } } ] }
        });
        assert_eq!(pick_reddit_url(&listing).as_deref(), Some("https://i.redd.it/fox.jpg"));

        let empty = serde_json::json!({ "data": { "children": [] } });
        assert_eq!(pick_reddit_url(&empty), None);
    }

    #[tokio::test]
    async fn test_http_client_sends_user_agent() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).to_lowercase()
        });

        let response = http_client().unwrap().get(format!("http://{}/", addr)).send().await.unwrap();
        assert!(response.status().is_success());

        let request = server.await.unwrap();
        assert!(request.contains("user-agent: k3bot/"), "request was: {}", request);
    }

    #[tokio::test]
    async fn test_roll_command_through_dispatch() {
        let bot = Bot::builder().prefix("!").extension("fun", setup).build();
        bot.load_extension("fun").unwrap();
        let channel = Arc::new(RecordingChannel::default());

        let outcome = bot.dispatch(message("!roll 2d6 1d20", 1, channel.clone())).await;
        assert_eq!(outcome, Dispatch::Completed { command: "roll".to_string() });

        let sent = channel.sent();
        assert!(sent[0].starts_with("```\n2d6: ["));
        assert!(sent[0].contains("\n1d20: ["));

        bot.dispatch(message("!roll lots", 1, channel.clone())).await;
        assert!(channel.sent()[1].starts_with("No valid rolls supplied."));
    }

    #[tokio::test]
    async fn test_coin_alias() {
        let bot = Bot::builder().prefix("!").extension("fun", setup).build();
        bot.load_extension("fun").unwrap();
        let channel = Arc::new(RecordingChannel::default());

        bot.dispatch(message("!cflip", 1, channel.clone())).await;
        let sent = channel.sent();
        assert!(sent[0] == "Heads!" || sent[0] == "Tails!");
    }

    #[tokio::test]
    async fn test_setup_registers_and_unload_removes() {
        let bot = Bot::builder().extension("fun", setup).build();
        bot.load_extension("fun").unwrap();

        assert_eq!(bot.cog_names(), vec!["Fun".to_string()]);
        assert_eq!(bot.commands().len(), COMMANDS.len());
        assert_eq!(bot.command("kitsune").unwrap().name(), "fox");
        assert_eq!(bot.command("neko").unwrap().name(), "kemono");
        let cooldown = bot.command("dog").unwrap().cooldown_policy().map(|c| (c.rate(), c.per()));
        assert_eq!(cooldown, Some((6, Duration::from_secs(12))));

        bot.unload_cog("Fun").unwrap();
        assert!(bot.commands().is_empty());
        assert!(bot.command("doge").is_none());

        // Unloaded cleanly, so it can be loaded again
        bot.load_extension("fun").unwrap();
    }
}
