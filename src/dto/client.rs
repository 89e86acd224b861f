use crate::Chips;
use serde::Deserialize;
use serde::Serialize;

/// Peer role declared at handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    Observer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Observer => write!(f, "observer"),
        }
    }
}

/// Messages received from a peer over the WebSocket.
/// Unknown fields are ignored so clients can version forward.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The handshake record, required as the first frame.
    Connect {
        name: String,
        #[serde(default)]
        role: Role,
        #[serde(default)]
        game: Option<String>,
        #[serde(default)]
        auth_token: Option<String>,
    },
    /// A betting decision for the hand in progress.
    Action {
        action: String,
        #[serde(default)]
        amount: Chips,
    },
}

/// The decision payload of an action frame, detached from serde.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFrame {
    pub action: String,
    pub amount: Chips,
}

impl ActionFrame {
    pub fn new(action: impl Into<String>, amount: Chips) -> Self {
        Self {
            action: action.into(),
            amount,
        }
    }
}
