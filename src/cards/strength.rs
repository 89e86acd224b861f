use super::card::Card;
use super::evaluator::Evaluator;
use super::hand::Hand;
use super::kicks::Kickers;
use super::ranking::Ranking;

/// A hand's strength: category plus kicker cards.
///
/// Constructed from a Hand, an unordered set of cards. Ord compares the
/// Ranking first and breaks ties by the kicker mask, which is exactly
/// the standard high-hand total order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct Strength {
    value: Ranking,
    kicks: Kickers,
}

impl Strength {
    pub fn value(&self) -> Ranking {
        self.value
    }
    pub fn kicks(&self) -> Kickers {
        self.kicks
    }
    /// the same total order packed into a single integer:
    /// category(4b) | primary(4b) | secondary(4b) | kicker mask(13b)
    pub fn packed(&self) -> u32 {
        let cat = self.value.category();
        let hi = self.value.primary() as u32;
        let lo = self.value.secondary().map(|r| r as u32).unwrap_or(0);
        cat << 21 | hi << 17 | lo << 13 | self.kicks.mask() as u32
    }
    /// human readable category, e.g. "Two Pair, Aces and Kings"
    pub fn label(&self) -> String {
        self.value.to_string()
    }
}

impl From<Hand> for Strength {
    fn from(hand: Hand) -> Self {
        Self::from(Evaluator::from(hand))
    }
}

impl From<Evaluator> for Strength {
    fn from(e: Evaluator) -> Self {
        let value = e.find_ranking();
        let kicks = e.find_kickers(value);
        Self { value, kicks }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<18}{:>5}", self.value, self.kicks)
    }
}

/// Maps seven distinct cards onto a totally ordered rank, higher is stronger.
/// Calling with malformed or non-distinct cards is a programmer error.
pub fn rank7(cards: [Card; 7]) -> u32 {
    let hand = Hand::from(cards.to_vec());
    assert!(hand.count() == 7, "seven distinct cards required");
    Strength::from(hand).packed()
}
