use super::rank::Rank;

/// A poker hand's category and defining ranks.
///
/// Ordered by hand strength; kicker cards break ties within a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard(Rank),        // 4 kickers
    OnePair(Rank),         // 3 kickers
    TwoPair(Rank, Rank),   // 1 kicker
    ThreeOAK(Rank),        // 2 kickers
    Straight(Rank),        // 0 kickers
    Flush(Rank),           // 4 kickers (remaining suited ranks)
    FullHouse(Rank, Rank), // 0 kickers
    FourOAK(Rank),         // 1 kicker
    StraightFlush(Rank),   // 0 kickers
}

impl Ranking {
    pub fn n_kickers(&self) -> usize {
        match self {
            Ranking::HighCard(_) | Ranking::Flush(_) => 4,
            Ranking::OnePair(_) => 3,
            Ranking::ThreeOAK(_) => 2,
            Ranking::FourOAK(_) | Ranking::TwoPair(_, _) => 1,
            _ => 0,
        }
    }
    /// category index for the packed rank7 encoding
    pub fn category(&self) -> u32 {
        match self {
            Ranking::HighCard(_) => 0,
            Ranking::OnePair(_) => 1,
            Ranking::TwoPair(_, _) => 2,
            Ranking::ThreeOAK(_) => 3,
            Ranking::Straight(_) => 4,
            Ranking::Flush(_) => 5,
            Ranking::FullHouse(_, _) => 6,
            Ranking::FourOAK(_) => 7,
            Ranking::StraightFlush(_) => 8,
        }
    }
    pub fn primary(&self) -> Rank {
        match *self {
            Ranking::HighCard(r)
            | Ranking::OnePair(r)
            | Ranking::ThreeOAK(r)
            | Ranking::Straight(r)
            | Ranking::Flush(r)
            | Ranking::FourOAK(r)
            | Ranking::StraightFlush(r) => r,
            Ranking::TwoPair(hi, _) | Ranking::FullHouse(hi, _) => hi,
        }
    }
    pub fn secondary(&self) -> Option<Rank> {
        match *self {
            Ranking::TwoPair(_, lo) | Ranking::FullHouse(_, lo) => Some(lo),
            _ => None,
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ranking::HighCard(r) => write!(f, "High Card, {}", r.name()),
            Ranking::OnePair(r) => write!(f, "One Pair, {}", r.plural()),
            Ranking::TwoPair(hi, lo) => write!(f, "Two Pair, {} and {}", hi.plural(), lo.plural()),
            Ranking::ThreeOAK(r) => write!(f, "Three of a Kind, {}", r.plural()),
            Ranking::Straight(r) => write!(f, "Straight, {} high", r.name()),
            Ranking::Flush(r) => write!(f, "Flush, {} high", r.name()),
            Ranking::FullHouse(t, p) => {
                write!(f, "Full House, {} over {}", t.plural(), p.plural())
            }
            Ranking::FourOAK(r) => write!(f, "Four of a Kind, {}", r.plural()),
            Ranking::StraightFlush(r) => write!(f, "Straight Flush, {} high", r.name()),
        }
    }
}
