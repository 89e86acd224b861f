use super::card::Card;

/// Hand is a bitstring of 52 bits stored as a u64.
/// Each bit represents a card in the (unordered) set.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Hand(u64);

impl Hand {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn add(lhs: Self, rhs: Self) -> Self {
        assert!(lhs.0 & rhs.0 == 0, "overlapping card sets");
        Self(lhs.0 | rhs.0)
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.0 & u64::from(*card) != 0
    }
    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }
}

// u64 isomorphism
impl From<u64> for Hand {
    fn from(n: u64) -> Self {
        Self(n)
    }
}
impl From<Hand> for u64 {
    fn from(hand: Hand) -> Self {
        hand.0
    }
}

// we SUM/OR the cards to get the bitstring
impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self(cards.into_iter().map(u64::from).fold(0, |a, b| a | b))
    }
}
// we pluck the 1s out of the bitstring and convert them to cards
impl From<Hand> for Vec<Card> {
    fn from(hand: Hand) -> Self {
        (0..52u8)
            .filter(|i| hand.0 & (1u64 << i) != 0)
            .map(Card::from)
            .collect()
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in Vec::<Card>::from(*self) {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}
