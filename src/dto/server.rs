use crate::Chips;
use serde::Serialize;

/// Messages sent from server to client over WebSocket.
///
/// Every per-hand record carries the hand id so clients can associate
/// events with hands and discard stale frames. Field names are stable
/// wire contract; see the protocol module for construction.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A new hand is starting. Hole cards are the viewer's own;
    /// observers get an empty list and a seat of -1.
    HandStart {
        hand_id: String,
        hole_cards: Vec<String>,
        your_seat: i64,
        button: i64,
        players: Vec<SeatInfo>,
        small_blind: Chips,
        big_blind: Chips,
    },
    /// It is your turn to act.
    ActionRequest {
        hand_id: String,
        time_remaining: i64,
        valid_actions: Vec<String>,
        to_call: Chips,
        min_bet: Chips,
        min_raise: Chips,
        pot: Chips,
    },
    /// A seat acted, including posted blinds and synthetic timeouts.
    PlayerAction {
        hand_id: String,
        street: String,
        seat: i64,
        player_name: String,
        action: String,
        amount_paid: Chips,
        player_bet: Chips,
        player_chips: Chips,
        pot: Chips,
    },
    /// Community cards revealed, cumulative board in deal order.
    StreetChange {
        hand_id: String,
        street: String,
        board: Vec<String>,
    },
    /// Low-rate full snapshot of pot and seats.
    GameUpdate {
        hand_id: String,
        pot: Chips,
        players: Vec<SeatInfo>,
    },
    /// Hand ended with pot allocation and reveals.
    HandResult {
        hand_id: String,
        winners: Vec<WinnerInfo>,
        board: Vec<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        showdown: Vec<ShowdownInfo>,
    },
    /// The table stopped dealing hands.
    GameCompleted {
        game_id: String,
        hands_completed: u64,
        hand_limit: u64,
        reason: String,
        seed: i64,
        players: Vec<NetInfo>,
    },
    /// Per-peer error report. Never broadcast.
    Error { code: String, message: String },
}

/// Public snapshot of one seat.
#[derive(Clone, Debug, Serialize)]
pub struct SeatInfo {
    pub seat: i64,
    pub name: String,
    pub chips: Chips,
    pub bet: Chips,
    pub folded: bool,
    pub all_in: bool,
}

/// A winner's payout at hand end.
#[derive(Clone, Debug, Serialize)]
pub struct WinnerInfo {
    pub name: String,
    pub amount: Chips,
    pub hole_cards: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_rank: Option<String>,
}

/// A non-winner who reached showdown and must reveal.
#[derive(Clone, Debug, Serialize)]
pub struct ShowdownInfo {
    pub name: String,
    pub hole_cards: Vec<String>,
    pub hand_rank: String,
}

/// Per-player aggregate for the game summary.
#[derive(Clone, Debug, Serialize)]
pub struct NetInfo {
    pub name: String,
    pub net_chips: Chips,
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

/// Stable error codes of the wire contract.
pub mod codes {
    pub const ILLEGAL_ACTION: &str = "illegal_action";
    pub const NOT_YOUR_TURN: &str = "not_your_turn";
    pub const UNEXPECTED_FRAME: &str = "unexpected_frame";
    pub const SLOW_CONSUMER: &str = "slow_consumer";
    pub const ACTION_TIMEOUT: &str = "action_timeout";
    pub const HANDSHAKE_TIMEOUT: &str = "handshake_timeout";
    pub const PROTOCOL_ERROR: &str = "protocol_error";
    pub const TABLE_FULL: &str = "table_full";
    pub const TABLE_CLOSED: &str = "table_closed";
    pub const UNKNOWN_TABLE: &str = "unknown_table";
    pub const BUSTED: &str = "busted";
}
