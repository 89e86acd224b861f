use crate::Chips;
use std::time::Duration;

/// Boot-time table options.
///
/// The seed stored here is already resolved: a zero on the command line
/// picks a time-derived value before the table is built, so every run
/// can be replayed from its logs.
#[derive(Debug, Clone)]
pub struct Config {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub start_chips: Chips,
    pub timeout: Duration,
    pub min_players: usize,
    pub max_players: usize,
    pub require_player: bool,
    pub infinite_bankroll: bool,
    pub hand_limit: u64,
    pub seed: u64,
    pub enable_stats: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            small_blind: 5,
            big_blind: 10,
            start_chips: 1000,
            timeout: Duration::from_secs(10),
            min_players: 2,
            max_players: 6,
            require_player: true,
            infinite_bankroll: false,
            hand_limit: 0,
            seed: 0,
            enable_stats: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.small_blind > 0, "small blind must be positive");
        anyhow::ensure!(
            self.small_blind <= self.big_blind,
            "small blind cannot exceed big blind"
        );
        anyhow::ensure!(
            self.start_chips >= self.big_blind,
            "starting stack cannot cover the big blind"
        );
        anyhow::ensure!(self.min_players >= 2, "a hand needs at least two seats");
        anyhow::ensure!(
            self.min_players <= self.max_players,
            "min players exceeds max players"
        );
        anyhow::ensure!(
            self.max_players <= crate::MAX_SEATS,
            "max players exceeds the ring size"
        );
        anyhow::ensure!(!self.timeout.is_zero(), "decision deadline must be positive");
        Ok(())
    }
}
