use crate::Chips;

/// A seat's betting decision, already resolved against the wire verbs.
///
/// Raise carries the new total in-round bet for the seat, not the increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
    Shove,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call => write!(f, "CALL"),
            Action::Raise(x) => write!(f, "RAISE {}", x),
            Action::Shove => write!(f, "SHOVE"),
        }
    }
}

/// Wire-visible action words, including the pseudo-actions that only
/// the server itself originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Fold,
    Check,
    Call,
    Raise,
    Allin,
    SmallBlind,
    BigBlind,
    TimeoutFold,
    TimeoutCheck,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Verb::Fold => write!(f, "fold"),
            Verb::Check => write!(f, "check"),
            Verb::Call => write!(f, "call"),
            Verb::Raise => write!(f, "raise"),
            Verb::Allin => write!(f, "allin"),
            Verb::SmallBlind => write!(f, "post_small_blind"),
            Verb::BigBlind => write!(f, "post_big_blind"),
            Verb::TimeoutFold => write!(f, "timeout_fold"),
            Verb::TimeoutCheck => write!(f, "timeout_check"),
        }
    }
}

impl From<Action> for Verb {
    fn from(action: Action) -> Self {
        match action {
            Action::Fold => Verb::Fold,
            Action::Check => Verb::Check,
            Action::Call => Verb::Call,
            Action::Raise(_) => Verb::Raise,
            Action::Shove => Verb::Allin,
        }
    }
}
