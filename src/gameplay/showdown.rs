use super::ledger::Pot;
use crate::Chips;
use crate::cards::Strength;

/// Ephemeral settlement of a finished hand.
///
/// Each pot layer is awarded to the highest-ranked eligible strength.
/// Ties split evenly by chip count; remainder chips go one each to the
/// earliest tied seats left of the dealer.
pub struct Showdown {
    pots: Vec<Pot>,
    strengths: Vec<Strength>,
    dealer: usize,
}

impl Showdown {
    pub fn new(pots: Vec<Pot>, strengths: Vec<Strength>, dealer: usize) -> Self {
        Self {
            pots,
            strengths,
            dealer,
        }
    }

    /// reward per seat index, same length as strengths
    pub fn settle(self) -> Vec<Chips> {
        let mut rewards = vec![0; self.strengths.len()];
        for pot in &self.pots {
            assert!(!pot.eligible.is_empty(), "pot with no eligible seat");
            let best = pot
                .eligible
                .iter()
                .map(|i| self.strengths[*i])
                .max()
                .expect("non-empty eligibility");
            let mut winners = pot
                .eligible
                .iter()
                .copied()
                .filter(|i| self.strengths[*i] == best)
                .collect::<Vec<usize>>();
            winners.sort_by_key(|i| self.precedence(*i));
            let share = pot.amount / winners.len() as Chips;
            let remainder = pot.amount % winners.len() as Chips;
            for winner in &winners {
                rewards[*winner] += share;
            }
            for winner in winners.iter().take(remainder as usize) {
                rewards[*winner] += 1;
            }
        }
        rewards
    }

    /// distance clockwise from the seat left of the dealer
    fn precedence(&self, seat: usize) -> usize {
        let n = self.strengths.len();
        (seat + n - self.dealer - 1) % n
    }
}
