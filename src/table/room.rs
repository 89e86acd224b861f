use super::bus::Bus;
use super::bus::PeerId;
use super::config::Config;
use super::stats::Stats;
use super::timer::Timer;
use crate::Position;
use crate::cards::Shuffler;
use crate::dto::ActionFrame;
use crate::dto::Protocol;
use crate::dto::Role;
use crate::dto::ServerMessage;
use crate::dto::codes;
use crate::gameplay::Action;
use crate::gameplay::ActionError;
use crate::gameplay::Event;
use crate::gameplay::Game;
use crate::gameplay::Verb;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

/// A successful admission: the peer's identity and its outbound channel.
#[derive(Debug)]
pub struct Admission {
    pub peer: PeerId,
    pub outbox: mpsc::Receiver<ServerMessage>,
}

/// Inputs multiplexed onto the coordinator's single queue.
/// FIFO per source; the queue is drained in arrival order.
#[derive(Debug)]
pub enum Input {
    Admit {
        name: String,
        role: Role,
        reply: oneshot::Sender<Result<Admission, ServerMessage>>,
    },
    Depart(PeerId),
    Frame(PeerId, ActionFrame),
    Shutdown,
}

/// A seated peer between hands.
#[derive(Debug, Clone)]
struct Chair {
    peer: PeerId,
    name: String,
    stack: crate::Chips,
    connected: bool,
}

/// Central coordinator for one live table.
///
/// Single writer: all seat, hand, and timer state lives inside this
/// task, and every other task reaches it through the input queue. The
/// loop deals hands whenever the seated population is eligible,
/// enforces the per-decision deadline, and pushes every transition to
/// the event bus.
pub struct Room {
    config: Config,
    bus: Bus,
    chairs: Vec<Option<Chair>>,
    inbox: mpsc::UnboundedReceiver<Input>,
    shuffler: Shuffler,
    timer: Timer,
    stats: Stats,
    button: Position,
    draining: bool,
    poisoned: bool,
    completed: bool,
}

impl Room {
    pub fn new(id: u64, config: Config) -> (Self, mpsc::UnboundedSender<Input>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let chairs = vec![None; config.max_players];
        let shuffler = Shuffler::new(config.seed);
        let room = Self {
            bus: Bus::new(Protocol::new(id.to_string())),
            chairs,
            inbox: rx,
            shuffler,
            timer: Timer::default(),
            stats: Stats::default(),
            button: 0,
            draining: false,
            poisoned: false,
            completed: false,
            config,
        };
        (room, tx)
    }

    pub async fn run(mut self) {
        log::info!("table {} open", self.bus.protocol().game());
        loop {
            if self.draining {
                self.complete("shutdown");
                break;
            }
            if self.can_deal() {
                self.play_hand().await;
                continue;
            }
            match self.inbox.recv().await {
                Some(input) => self.handle(input),
                None => break,
            }
        }
        log::info!("table {} closed", self.bus.protocol().game());
    }
}

impl Room {
    /// inputs arriving between hands
    fn handle(&mut self, input: Input) {
        match input {
            Input::Admit { name, role, reply } => self.admit(name, role, reply),
            Input::Depart(peer) => self.depart(peer, false),
            Input::Frame(peer, _) => self.bus.unicast(
                peer,
                ServerMessage::error(codes::NOT_YOUR_TURN, "no hand in progress"),
            ),
            Input::Shutdown => self.draining = true,
        }
    }

    fn admit(
        &mut self,
        name: String,
        role: Role,
        reply: oneshot::Sender<Result<Admission, ServerMessage>>,
    ) {
        if self.draining {
            let refusal = ServerMessage::error(codes::TABLE_CLOSED, "table is shutting down");
            let _ = reply.send(Err(refusal));
            return;
        }
        let admission = match role {
            Role::Observer => {
                let (peer, outbox) = self.bus.subscribe(name.clone(), role, None);
                log::info!("observer {} joined table {}", name, self.bus.protocol().game());
                Ok(Admission { peer, outbox })
            }
            Role::Player => match self.chairs.iter().position(Option::is_none) {
                None => Err(ServerMessage::error(codes::TABLE_FULL, "no empty seats")),
                Some(seat) => {
                    let (peer, outbox) = self.bus.subscribe(name.clone(), role, Some(seat));
                    self.chairs[seat] = Some(Chair {
                        peer,
                        name: name.clone(),
                        stack: self.config.start_chips,
                        connected: true,
                    });
                    log::info!("seated {} at seat {}", name, seat);
                    Ok(Admission { peer, outbox })
                }
            },
        };
        let _ = reply.send(admission);
    }

    /// mid-hand departures mark the seat disconnected so the hand can
    /// finish; between hands the seat is vacated on the spot
    fn depart(&mut self, peer: PeerId, in_hand: bool) {
        self.bus.drop_peer(peer);
        let seat = self
            .chairs
            .iter()
            .position(|c| c.as_ref().is_some_and(|c| c.peer == peer));
        if let Some(seat) = seat {
            match in_hand {
                true => {
                    self.chairs[seat].as_mut().expect("occupied").connected = false;
                    log::info!("seat {} disconnected mid-hand", seat);
                }
                false => {
                    let chair = self.chairs[seat].take().expect("occupied");
                    log::info!("{} left seat {}", chair.name, seat);
                }
            }
        }
    }

    fn can_deal(&self) -> bool {
        if self.poisoned || self.draining || self.completed {
            return false;
        }
        let seated = self
            .chairs
            .iter()
            .flatten()
            .filter(|c| c.connected && c.stack >= self.config.big_blind)
            .count();
        seated >= self.config.min_players && (!self.config.require_player || seated > 0)
    }

    async fn play_hand(&mut self) {
        self.advance_button();
        let hand = self.stats.hands() + 1;
        let players = self
            .chairs
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c.name.clone(), c.stack)))
            .collect::<Vec<_>>();
        let dealer = players
            .iter()
            .position(|(i, _, _)| *i == self.button)
            .expect("button rests on an occupied seat");
        let deck = self.shuffler.deck(hand);
        let dealt = Game::deal(
            hand,
            dealer,
            players,
            self.config.small_blind,
            self.config.big_blind,
            deck,
        );
        let (mut game, events) = match dealt {
            Ok(dealt) => dealt,
            Err(error) => return self.abort(hand, Vec::new(), error),
        };
        self.bus.publish_all(&events);
        while let Some(position) = game.actor() {
            let connected = self.chairs[position]
                .as_ref()
                .is_some_and(|c| c.connected);
            let step = match connected {
                true => self.ask(&mut game, position).await,
                // disconnected seats auto-fold without burning the clock
                false => game.apply(position, Action::Fold, Verb::Fold).map(|events| {
                    self.bus.publish_all(&events);
                }),
            };
            if let Err(error) = step {
                let board = game.board().cards().to_vec();
                return self.abort(game.hand(), board, error);
            }
        }
        self.conclude(game);
    }

    /// emit the request, arm the deadline, and wait for a legal action.
    /// invalid frames are answered per-peer and leave the clock running.
    async fn ask(&mut self, game: &mut Game, position: Position) -> Result<(), ActionError> {
        let peer = self.chairs[position].as_ref().expect("occupied seat").peer;
        self.timer.start(self.config.timeout);
        let request = Event::ActionRequest {
            hand: game.hand(),
            seat: position,
            remaining: self.timer.remaining().unwrap_or_default().as_millis() as i64,
            actions: game.legal(),
            to_call: game.to_call(),
            min_bet: game.min_bet(),
            min_raise: game.min_raise_to(),
            pot: game.pot(),
        };
        self.bus.request(peer, &request);
        loop {
            let deadline = self.timer.deadline().expect("deadline armed");
            let input = match tokio::time::timeout_at(deadline, self.inbox.recv()).await {
                Err(_) => return self.expire(game, position, peer),
                Ok(None) => {
                    self.draining = true;
                    return self.expire(game, position, peer);
                }
                Ok(Some(input)) => input,
            };
            match input {
                Input::Frame(from, frame) if from == peer => {
                    match Protocol::action(&frame, game.bet()) {
                        Err(e) => self.bus.unicast(
                            peer,
                            ServerMessage::error(codes::ILLEGAL_ACTION, e.to_string()),
                        ),
                        Ok((action, verb)) => match game.apply(position, action, verb) {
                            Ok(events) => {
                                self.timer.clear();
                                self.bus.publish_all(&events);
                                return Ok(());
                            }
                            Err(ActionError::Illegal(message)) => self.bus.unicast(
                                peer,
                                ServerMessage::error(codes::ILLEGAL_ACTION, message),
                            ),
                            Err(ActionError::NotYourTurn) => self.bus.unicast(
                                peer,
                                ServerMessage::error(codes::NOT_YOUR_TURN, "not your turn"),
                            ),
                            Err(fatal) => return Err(fatal),
                        },
                    }
                }
                Input::Frame(from, _) => self.bus.unicast(
                    from,
                    ServerMessage::error(codes::NOT_YOUR_TURN, "another seat is acting"),
                ),
                Input::Admit { name, role, reply } => self.admit(name, role, reply),
                Input::Depart(from) if from == peer => {
                    self.depart(from, true);
                    self.timer.clear();
                    let events = game.apply(position, Action::Fold, Verb::Fold)?;
                    self.bus.publish_all(&events);
                    return Ok(());
                }
                Input::Depart(from) => self.depart(from, true),
                // finish the hand in flight before draining
                Input::Shutdown => self.draining = true,
            }
        }
    }

    /// deadline fired: apply the passive action and notify the peer
    fn expire(
        &mut self,
        game: &mut Game,
        position: Position,
        peer: PeerId,
    ) -> Result<(), ActionError> {
        self.timer.clear();
        let action = game.passive();
        let verb = match action {
            Action::Fold => Verb::TimeoutFold,
            _ => Verb::TimeoutCheck,
        };
        self.bus.unicast(
            peer,
            ServerMessage::error(codes::ACTION_TIMEOUT, "decision deadline expired"),
        );
        let events = game.apply(position, action, verb)?;
        self.bus.publish_all(&events);
        Ok(())
    }

    /// write back stacks, vacate the disconnected and the busted,
    /// refill under infinite bankroll, and honor the hand limit
    fn conclude(&mut self, game: Game) {
        debug_assert!(game.is_complete());
        for seat in game.seats() {
            if let Some(chair) = self.chairs[seat.position()].as_mut() {
                let delta = seat.stack() - chair.stack;
                chair.stack = seat.stack();
                let name = chair.name.clone();
                self.stats.record(&name, delta);
            }
        }
        self.stats.finish_hand();
        if self.config.enable_stats {
            self.stats.log(self.config.big_blind);
        }
        for i in 0..self.chairs.len() {
            let Some(chair) = self.chairs[i].clone() else {
                continue;
            };
            if !chair.connected {
                self.chairs[i] = None;
                log::info!("vacated seat {} ({} disconnected)", i, chair.name);
            } else if self.config.infinite_bankroll {
                self.chairs[i].as_mut().expect("occupied").stack = self.config.start_chips;
            } else if chair.stack < self.config.big_blind {
                self.chairs[i] = None;
                self.bus.unicast(
                    chair.peer,
                    ServerMessage::error(codes::BUSTED, "stack below the big blind"),
                );
                self.bus.drop_peer(chair.peer);
                log::info!("seat {} busted ({})", i, chair.name);
            }
        }
        if self.config.hand_limit > 0 && self.stats.hands() >= self.config.hand_limit {
            self.complete("hand_limit");
        }
    }

    /// structural contradiction: describe the abort and refuse new hands
    fn abort(&mut self, hand: u64, board: Vec<crate::cards::Card>, error: ActionError) {
        log::error!("aborting hand {}: {}", hand, error);
        self.poisoned = true;
        self.bus.publish(&Event::HandResult {
            hand,
            board,
            winners: Vec::new(),
            showdown: Vec::new(),
        });
    }

    fn complete(&mut self, reason: &str) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.bus.publish(&Event::GameCompleted {
            hands: self.stats.hands(),
            limit: self.config.hand_limit,
            reason: reason.to_string(),
            seed: self.config.seed,
            net: self.stats.summary(),
        });
        log::info!(
            "table {} completed after {} hands: {}",
            self.bus.protocol().game(),
            self.stats.hands(),
            reason
        );
    }

    fn advance_button(&mut self) {
        self.button = (1..=self.chairs.len())
            .map(|k| (self.button + k) % self.chairs.len())
            .find(|i| self.chairs[*i].is_some())
            .expect("an occupied seat exists when dealing");
    }
}
