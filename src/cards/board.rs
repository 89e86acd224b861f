use super::card::Card;
use super::hand::Hand;
use super::street::Street;

/// Community cards in deal order. Holds 0, 3, 4, or 5 cards.
#[derive(Debug, Clone, Default)]
pub struct Board {
    cards: Vec<Card>,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cards: Vec::with_capacity(5),
        }
    }
    pub fn add(&mut self, card: Card) {
        assert!(self.cards.len() < 5, "board overflow");
        self.cards.push(card);
    }
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
    pub fn street(&self) -> Street {
        match self.cards.len() {
            0 => Street::Pref,
            3 => Street::Flop,
            4 => Street::Turn,
            5 => Street::Rive,
            n => panic!("impossible board size {}", n),
        }
    }
}

impl From<&Board> for Hand {
    fn from(board: &Board) -> Self {
        Hand::from(board.cards.clone())
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for card in &self.cards {
            write!(f, "{} ", card)?;
        }
        Ok(())
    }
}
