use super::card::Card;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Seeded source of per-hand deck permutations.
/// Identical (seed, hand index) always yields an identical shuffle.
#[derive(Debug, Clone, Copy)]
pub struct Shuffler {
    seed: u64,
}

impl Shuffler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// a fresh unbiased Fisher-Yates shuffle for the given hand index
    pub fn deck(&self, hand: u64) -> Deck {
        let mut rng = SmallRng::seed_from_u64(self.mix(hand));
        let mut deck = Deck::fresh();
        deck.cards.shuffle(&mut rng);
        deck
    }
    // splitmix-style avalanche so consecutive hand indices decorrelate
    fn mix(&self, hand: u64) -> u64 {
        let mut x = self.seed ^ hand.wrapping_mul(0x9E3779B97F4A7C15);
        x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
        x ^ (x >> 31)
    }
}

/// A permutation of the 52 canonical cards, drawn without replacement.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    fn fresh() -> Self {
        Self {
            cards: (0..52u8).map(Card::from).collect(),
        }
    }
    pub fn draw(&mut self) -> Card {
        self.cards.pop().expect("deck holds enough cards for a hand")
    }
    pub fn burn(&mut self) {
        let _ = self.draw();
    }
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

/// an explicit card order, drawn back to front; the last card is dealt first
impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn deck_holds_each_card_once() {
        let mut deck = Shuffler::new(42).deck(0);
        let mut seen = HashSet::new();
        for _ in 0..52 {
            seen.insert(u8::from(deck.draw()));
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn shuffles_are_deterministic() {
        let a = Shuffler::new(7).deck(3);
        let b = Shuffler::new(7).deck(3);
        assert_eq!(a.cards, b.cards);
    }

    #[test]
    fn hands_decorrelate() {
        let a = Shuffler::new(7).deck(0);
        let b = Shuffler::new(7).deck(1);
        assert_ne!(a.cards, b.cards);
    }

    #[test]
    fn seeds_decorrelate() {
        let a = Shuffler::new(0).deck(0);
        let b = Shuffler::new(1).deck(0);
        assert_ne!(a.cards, b.cards);
    }
}
