//! botpoker server binary
//!
//! Boots the registry with one table and serves WebSocket peers.
//! Bots connect to /ws, send a connect record, and play hands until
//! the hand limit or a shutdown signal.

use botpoker::Chips;
use botpoker::session::Server;
use botpoker::table::Config;
use botpoker::table::Registry;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "botpoker", version, about = "No-Limit Hold'em host for programmatic agents")]
struct Args {
    /// address for the HTTP listener
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    bind: String,
    #[arg(long, env = "SMALL_BLIND", default_value_t = 5)]
    small_blind: Chips,
    #[arg(long, env = "BIG_BLIND", default_value_t = 10)]
    big_blind: Chips,
    #[arg(long, env = "START_CHIPS", default_value_t = 1000)]
    start_chips: Chips,
    /// per-decision deadline in milliseconds
    #[arg(long, env = "TIMEOUT_MS", default_value_t = 10_000)]
    timeout: u64,
    #[arg(long, env = "MIN_PLAYERS", default_value_t = 2)]
    min_players: usize,
    #[arg(long, env = "MAX_PLAYERS", default_value_t = 6)]
    max_players: usize,
    /// refuse to start hands without at least one player-role peer
    #[arg(long, env = "REQUIRE_PLAYER", action = clap::ArgAction::Set, default_value_t = true)]
    require_player: bool,
    /// reset every stack to start_chips before each hand
    #[arg(long, env = "INFINITE_BANKROLL", action = clap::ArgAction::Set, default_value_t = false)]
    infinite_bankroll: bool,
    /// stop dealing after this many hands; 0 is unlimited
    #[arg(long, env = "HAND_LIMIT", default_value_t = 0)]
    hand_limit: u64,
    /// deck shuffle seed; 0 picks a time-derived value
    #[arg(long, env = "SEED", default_value_t = 0)]
    seed: i64,
    #[arg(long, env = "ENABLE_STATS", action = clap::ArgAction::Set, default_value_t = false)]
    enable_stats: bool,
}

impl Args {
    fn seed(&self) -> u64 {
        match self.seed {
            0 => std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time moves slow")
                .as_nanos() as u64,
            seed => seed as u64,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    botpoker::log();
    let seed = args.seed();
    log::info!("effective seed {}", seed);
    let config = Config {
        small_blind: args.small_blind,
        big_blind: args.big_blind,
        start_chips: args.start_chips,
        timeout: Duration::from_millis(args.timeout),
        min_players: args.min_players,
        max_players: args.max_players,
        require_player: args.require_player,
        infinite_bankroll: args.infinite_bankroll,
        hand_limit: args.hand_limit,
        seed,
        enable_stats: args.enable_stats,
    };
    config.validate()?;
    let registry = Arc::new(Registry::new(config));
    registry.open().await;
    let drain = registry.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("install signal handler");
        log::warn!("shutting down, letting hands in flight finish");
        drain.shutdown().await;
    });
    Server::run(&args.bind, registry).await?;
    Ok(())
}
