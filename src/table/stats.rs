use crate::Chips;
use std::collections::BTreeMap;

/// Running per-player aggregates derived from hand settlements.
///
/// Not core table state: the coordinator feeds it stack deltas at each
/// hand end and reads it back for the game summary. With stats enabled
/// it also logs a line per hand.
#[derive(Debug, Default)]
pub struct Stats {
    hands: u64,
    net: BTreeMap<String, Chips>,
}

impl Stats {
    pub fn hands(&self) -> u64 {
        self.hands
    }
    pub fn record(&mut self, name: &str, delta: Chips) {
        *self.net.entry(name.to_string()).or_insert(0) += delta;
    }
    pub fn finish_hand(&mut self) {
        self.hands += 1;
    }
    pub fn net(&self, name: &str) -> Chips {
        self.net.get(name).copied().unwrap_or(0)
    }
    /// ordered per-player net chip summary for game_completed
    pub fn summary(&self) -> Vec<(String, Chips)> {
        self.net
            .iter()
            .map(|(name, chips)| (name.clone(), *chips))
            .collect()
    }
    /// big blinds won per hundred hands, the standard winrate unit
    pub fn bb100(&self, name: &str, bblind: Chips) -> f64 {
        if self.hands == 0 || bblind == 0 {
            return 0.0;
        }
        self.net(name) as f64 / bblind as f64 / (self.hands as f64 / 100.0)
    }
    pub fn log(&self, bblind: Chips) {
        for (name, chips) in self.net.iter() {
            log::info!(
                "{:<16} {:>8} chips {:>8.1} bb/100 over {} hands",
                name,
                chips,
                self.bb100(name, bblind),
                self.hands,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nets_accumulate() {
        let mut stats = Stats::default();
        stats.record("hero", 50);
        stats.record("hero", -20);
        stats.record("foil", -30);
        stats.finish_hand();
        assert_eq!(stats.net("hero"), 30);
        assert_eq!(stats.net("foil"), -30);
        assert_eq!(stats.hands(), 1);
    }

    #[test]
    fn bb100_scales_by_hands() {
        let mut stats = Stats::default();
        stats.record("hero", 100);
        for _ in 0..100 {
            stats.finish_hand();
        }
        assert!((stats.bb100("hero", 10) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_is_name_ordered() {
        let mut stats = Stats::default();
        stats.record("zeta", 1);
        stats.record("alfa", 2);
        let summary = stats.summary();
        assert_eq!(summary[0].0, "alfa");
        assert_eq!(summary[1].0, "zeta");
    }
}
