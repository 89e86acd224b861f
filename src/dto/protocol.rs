use super::client::ActionFrame;
use super::client::ClientMessage;
use super::server::NetInfo;
use super::server::SeatInfo;
use super::server::ServerMessage;
use super::server::ShowdownInfo;
use super::server::WinnerInfo;
use crate::Chips;
use crate::Position;
use crate::gameplay::Action;
use crate::gameplay::Event;
use crate::gameplay::SeatView;
use crate::gameplay::Verb;

/// Errors raised while translating between wire frames and engine types.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    /// the frame did not decode as any known record
    Malformed(String),
    /// the frame decoded but names an impossible action
    InvalidAction(String),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
            Self::InvalidAction(s) => write!(f, "invalid action: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// The translation layer between internal events and the wire format.
///
/// Encoding is per viewer: private cards inside a HandStart are redacted
/// down to the viewing seat, observers see none.
pub struct Protocol {
    game: String,
}

impl Protocol {
    pub fn new(game: impl Into<String>) -> Self {
        Self { game: game.into() }
    }
    pub fn game(&self) -> &str {
        &self.game
    }
    fn hand_id(&self, hand: u64) -> String {
        format!("{}-{}", self.game, hand)
    }

    /// Converts an internal Event to a wire ServerMessage from the
    /// perspective of the given seat (None for observers).
    pub fn encode(&self, event: &Event, seat: Option<Position>) -> ServerMessage {
        match event {
            Event::HandStart {
                hand,
                button,
                sblind,
                bblind,
                seats,
                holes,
            } => ServerMessage::HandStart {
                hand_id: self.hand_id(*hand),
                hole_cards: holes
                    .iter()
                    .find(|(p, _)| Some(*p) == seat)
                    .map(|(_, hole)| hole.cards().iter().map(|c| c.to_string()).collect())
                    .unwrap_or_default(),
                your_seat: seat.map(|s| s as i64).unwrap_or(-1),
                button: *button as i64,
                players: seats.iter().map(SeatInfo::from).collect(),
                small_blind: *sblind,
                big_blind: *bblind,
            },
            Event::PlayerAction {
                hand,
                street,
                seat,
                name,
                verb,
                paid,
                bet,
                stack,
                pot,
            } => ServerMessage::PlayerAction {
                hand_id: self.hand_id(*hand),
                street: street.to_string(),
                seat: *seat as i64,
                player_name: name.clone(),
                action: verb.to_string(),
                amount_paid: *paid,
                player_bet: *bet,
                player_chips: *stack,
                pot: *pot,
            },
            Event::StreetChange { hand, street, board } => ServerMessage::StreetChange {
                hand_id: self.hand_id(*hand),
                street: street.to_string(),
                board: board.iter().map(|c| c.to_string()).collect(),
            },
            Event::GameUpdate { hand, pot, seats } => ServerMessage::GameUpdate {
                hand_id: self.hand_id(*hand),
                pot: *pot,
                players: seats.iter().map(SeatInfo::from).collect(),
            },
            Event::HandResult {
                hand,
                board,
                winners,
                showdown,
            } => ServerMessage::HandResult {
                hand_id: self.hand_id(*hand),
                winners: winners
                    .iter()
                    .map(|w| WinnerInfo {
                        name: w.name.clone(),
                        amount: w.amount,
                        hole_cards: w
                            .hole
                            .map(|h| h.cards().iter().map(|c| c.to_string()).collect())
                            .unwrap_or_default(),
                        hand_rank: w.label.clone(),
                    })
                    .collect(),
                board: board.iter().map(|c| c.to_string()).collect(),
                showdown: showdown
                    .iter()
                    .map(|r| ShowdownInfo {
                        name: r.name.clone(),
                        hole_cards: r.hole.cards().iter().map(|c| c.to_string()).collect(),
                        hand_rank: r.label.clone(),
                    })
                    .collect(),
            },
            Event::ActionRequest {
                hand,
                seat: _,
                remaining,
                actions,
                to_call,
                min_bet,
                min_raise,
                pot,
            } => ServerMessage::ActionRequest {
                hand_id: self.hand_id(*hand),
                time_remaining: *remaining,
                valid_actions: actions.iter().map(|v| v.to_string()).collect(),
                to_call: *to_call,
                min_bet: *min_bet,
                min_raise: *min_raise,
                pot: *pot,
            },
            Event::GameCompleted {
                hands,
                limit,
                reason,
                seed,
                net,
            } => ServerMessage::GameCompleted {
                game_id: self.game.clone(),
                hands_completed: *hands,
                hand_limit: *limit,
                reason: reason.clone(),
                seed: *seed as i64,
                players: net
                    .iter()
                    .map(|(name, chips)| NetInfo {
                        name: name.clone(),
                        net_chips: *chips,
                    })
                    .collect(),
            },
        }
    }

    /// Parses one inbound binary frame into a client record.
    pub fn decode(bytes: &[u8]) -> Result<ClientMessage, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Resolves an action frame against the current bet. The amount of a
    /// raise names the new total in-round bet, never the increment, and
    /// `bet` is accepted as a raise only when no bet is outstanding.
    pub fn action(frame: &ActionFrame, bet: Chips) -> Result<(Action, Verb), ProtocolError> {
        let raise = |amount: Chips| {
            if amount > 0 {
                Ok((Action::Raise(amount), Verb::Raise))
            } else {
                Err(ProtocolError::InvalidAction(
                    "raise requires a positive total".to_string(),
                ))
            }
        };
        match frame.action.as_str() {
            "fold" => Ok((Action::Fold, Verb::Fold)),
            "check" => Ok((Action::Check, Verb::Check)),
            "call" => Ok((Action::Call, Verb::Call)),
            "allin" => Ok((Action::Shove, Verb::Allin)),
            "raise" => raise(frame.amount),
            "bet" if bet == 0 => raise(frame.amount),
            "bet" => Err(ProtocolError::InvalidAction(
                "bet with a bet outstanding, use raise".to_string(),
            )),
            other => Err(ProtocolError::InvalidAction(format!(
                "unknown action: {}",
                other
            ))),
        }
    }
}

impl From<&SeatView> for SeatInfo {
    fn from(view: &SeatView) -> Self {
        Self {
            seat: view.seat as i64,
            name: view.name.clone(),
            chips: view.chips,
            bet: view.bet,
            folded: view.folded,
            all_in: view.all_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Hole;
    use crate::dto::Role;

    #[test]
    fn decode_connect_with_defaults() {
        let frame = br#"{"type":"connect","name":"hero"}"#;
        match Protocol::decode(frame).unwrap() {
            ClientMessage::Connect { name, role, game, auth_token } => {
                assert_eq!(name, "hero");
                assert_eq!(role, Role::Player);
                assert!(game.is_none());
                assert!(auth_token.is_none());
            }
            _ => panic!("expected connect"),
        }
    }

    #[test]
    fn decode_ignores_unknown_fields() {
        let frame = br#"{"type":"connect","name":"hero","shoe_size":43}"#;
        assert!(Protocol::decode(frame).is_ok());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(Protocol::decode(b"not json").is_err());
        assert!(Protocol::decode(br#"{"type":"warp"}"#).is_err());
    }

    #[test]
    fn action_verbs() {
        let (action, verb) = Protocol::action(&ActionFrame::new("fold", 0), 10).unwrap();
        assert_eq!(action, Action::Fold);
        assert_eq!(verb, Verb::Fold);
        let (action, _) = Protocol::action(&ActionFrame::new("raise", 250), 100).unwrap();
        assert_eq!(action, Action::Raise(250));
    }

    #[test]
    fn bet_is_raise_only_without_a_bet() {
        let (action, _) = Protocol::action(&ActionFrame::new("bet", 40), 0).unwrap();
        assert_eq!(action, Action::Raise(40));
        assert!(Protocol::action(&ActionFrame::new("bet", 40), 10).is_err());
    }

    #[test]
    fn raise_amount_must_be_positive() {
        assert!(Protocol::action(&ActionFrame::new("raise", 0), 10).is_err());
        assert!(Protocol::action(&ActionFrame::new("raise", -5), 10).is_err());
    }

    #[test]
    fn hand_start_redacts_holes_per_viewer() {
        use crate::cards::Card;
        let hole = Hole::from((
            Card::try_from("As").unwrap(),
            Card::try_from("Kd").unwrap(),
        ));
        let event = Event::HandStart {
            hand: 7,
            button: 0,
            sblind: 5,
            bblind: 10,
            seats: Vec::new(),
            holes: vec![(1, hole)],
        };
        let protocol = Protocol::new("1");
        match protocol.encode(&event, Some(1)) {
            ServerMessage::HandStart { hole_cards, your_seat, .. } => {
                assert_eq!(hole_cards, vec!["As", "Kd"]);
                assert_eq!(your_seat, 1);
            }
            _ => panic!("expected hand_start"),
        }
        match protocol.encode(&event, None) {
            ServerMessage::HandStart { hole_cards, your_seat, .. } => {
                assert!(hole_cards.is_empty());
                assert_eq!(your_seat, -1);
            }
            _ => panic!("expected hand_start"),
        }
    }

    #[test]
    fn tagged_wire_names() {
        let message = ServerMessage::error("not_your_turn", "wait");
        let json = message.to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""code":"not_your_turn""#));
    }
}
