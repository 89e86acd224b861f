use super::action::Verb;
use crate::Chips;
use crate::Position;
use crate::cards::Card;
use crate::cards::Hole;
use crate::cards::Street;

/// Public snapshot of one seat, as carried in broadcast events.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatView {
    pub seat: Position,
    pub name: String,
    pub chips: Chips,
    pub bet: Chips,
    pub folded: bool,
    pub all_in: bool,
}

/// A winner's allocation at hand end. Hole cards are present only when
/// the hand reached showdown; a win by folds stays hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct Award {
    pub seat: Position,
    pub name: String,
    pub amount: Chips,
    pub hole: Option<Hole>,
    pub label: Option<String>,
}

/// A non-winning seat that reached showdown and must reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub seat: Position,
    pub name: String,
    pub hole: Hole,
    pub label: String,
}

/// Events produced by the hand engine and the table coordinator.
///
/// The bus fans out owned copies; subscribers never hold references
/// into engine state. Hole cards inside HandStart are redacted down to
/// the viewer's own cards at encode time.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    HandStart {
        hand: u64,
        button: Position,
        sblind: Chips,
        bblind: Chips,
        seats: Vec<SeatView>,
        holes: Vec<(Position, Hole)>,
    },
    PlayerAction {
        hand: u64,
        street: Street,
        seat: Position,
        name: String,
        verb: Verb,
        paid: Chips,
        bet: Chips,
        stack: Chips,
        pot: Chips,
    },
    StreetChange {
        hand: u64,
        street: Street,
        board: Vec<Card>,
    },
    GameUpdate {
        hand: u64,
        pot: Chips,
        seats: Vec<SeatView>,
    },
    HandResult {
        hand: u64,
        board: Vec<Card>,
        winners: Vec<Award>,
        showdown: Vec<Reveal>,
    },
    ActionRequest {
        hand: u64,
        seat: Position,
        remaining: i64,
        actions: Vec<Verb>,
        to_call: Chips,
        min_bet: Chips,
        min_raise: Chips,
        pot: Chips,
    },
    GameCompleted {
        hands: u64,
        limit: u64,
        reason: String,
        seed: u64,
        net: Vec<(String, Chips)>,
    },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::HandStart { hand, button, .. } => {
                write!(f, "hand #{} (button P{})", hand, button)
            }
            Event::PlayerAction { seat, verb, paid, .. } => {
                write!(f, "P{}: {} ({})", seat, verb, paid)
            }
            Event::StreetChange { street, .. } => write!(f, "{}", street),
            Event::GameUpdate { pot, .. } => write!(f, "pot {}", pot),
            Event::HandResult { winners, .. } => {
                let s = winners
                    .iter()
                    .map(|w| format!("P{} wins {}", w.seat, w.amount))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "result: {}", s)
            }
            Event::ActionRequest { seat, .. } => write!(f, "P{} to act", seat),
            Event::GameCompleted { hands, .. } => write!(f, "game over after {} hands", hands),
        }
    }
}
