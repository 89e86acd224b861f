use super::action::Action;
use super::action::Verb;
use super::event::Award;
use super::event::Event;
use super::event::Reveal;
use super::event::SeatView;
use super::ledger::Ledger;
use super::seat::Seat;
use super::seat::State;
use super::showdown::Showdown;
use crate::Chips;
use crate::Position;
use crate::cards::Board;
use crate::cards::Deck;
use crate::cards::Hand;
use crate::cards::Hole;
use crate::cards::Street;
use crate::cards::Strength;

/// Engine failures surfaced to the coordinator.
///
/// NotYourTurn and Illegal are recoverable: the coordinator replies with
/// an error frame and keeps the decision deadline running. Fatal marks a
/// structural contradiction and poisons the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    NotYourTurn,
    Illegal(String),
    Fatal(String),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::NotYourTurn => write!(f, "not your turn"),
            Self::Illegal(s) => write!(f, "illegal action: {}", s),
            Self::Fatal(s) => write!(f, "engine invariant violated: {}", s),
        }
    }
}

impl std::error::Error for ActionError {}

/// The per-hand state machine.
///
/// A pure, synchronous step function: the coordinator deals it into
/// existence, feeds it one action at a time, and forwards the events it
/// returns. It never suspends and holds no channels or timers.
///
/// Betting rounds terminate through per-seat acted-at-level flags: a
/// full raise clears every other seat's flag, an all-in short raise
/// does not, and a seat whose flag is set may no longer raise.
#[derive(Debug, Clone)]
pub struct Game {
    hand: u64,
    sblind: Chips,
    bblind: Chips,
    seats: Vec<Seat>,
    dealer: usize,
    actor: usize,
    board: Board,
    deck: Deck,
    ledger: Ledger,
    min_raise: Chips,
    aggressor: Option<usize>,
    complete: bool,
}

impl Game {
    /// Start a hand: deal holes in ring order beginning left of the
    /// dealer, post blinds, and hand back the opening event sequence.
    /// Heads-up, the dealer posts the small blind and acts first.
    pub fn deal(
        hand: u64,
        dealer: usize,
        players: Vec<(Position, String, Chips)>,
        sblind: Chips,
        bblind: Chips,
        mut deck: Deck,
    ) -> Result<(Self, Vec<Event>), ActionError> {
        let n = players.len();
        assert!(n >= 2 && n <= crate::MAX_SEATS, "player count out of bounds");
        assert!(dealer < n, "dealer index out of bounds");
        assert!(sblind > 0 && sblind <= bblind, "malformed blind schedule");
        assert!(deck.remaining() >= 2 * n + 8, "deck too thin for a hand");
        let mut holes: Vec<Option<Hole>> = vec![None; n];
        for k in 1..=n {
            let i = (dealer + k) % n;
            holes[i] = Some(Hole::from((deck.draw(), deck.draw())));
        }
        let seats = players
            .into_iter()
            .zip(holes)
            .map(|((position, name, stack), hole)| {
                Seat::new(position, name, stack, hole.expect("hole dealt to every seat"))
            })
            .collect::<Vec<Seat>>();
        let mut game = Self {
            hand,
            sblind,
            bblind,
            seats,
            dealer,
            actor: 0,
            board: Board::empty(),
            deck,
            ledger: Ledger::new(n),
            min_raise: bblind,
            aggressor: None,
            complete: false,
        };
        let sb = if n == 2 { game.dealer } else { game.next(game.dealer) };
        let bb = game.next(sb);
        let mut events = vec![game.hand_start()];
        events.push(game.post(sb, game.sblind, Verb::SmallBlind));
        events.push(game.post(bb, game.bblind, Verb::BigBlind));
        events.push(game.update());
        game.actor = bb;
        game.advance(&mut events)?;
        Ok((game, events))
    }

    /// Apply one decision from the seat at the given ring position.
    /// The verb is echoed into the broadcast so synthetic actions keep
    /// their timeout labels.
    pub fn apply(
        &mut self,
        position: Position,
        action: Action,
        verb: Verb,
    ) -> Result<Vec<Event>, ActionError> {
        if self.complete {
            return Err(ActionError::NotYourTurn);
        }
        let i = self.actor;
        if self.seats[i].position() != position {
            return Err(ActionError::NotYourTurn);
        }
        self.validate(i, &action)?;
        let street = self.street();
        let paid = self.execute(i, action);
        let mut events = vec![
            Event::PlayerAction {
                hand: self.hand,
                street,
                seat: self.seats[i].position(),
                name: self.seats[i].name().to_string(),
                verb,
                paid,
                bet: self.ledger.round(i),
                stack: self.seats[i].stack(),
                pot: self.ledger.pot(),
            },
            self.update(),
        ];
        self.advance(&mut events)?;
        Ok(events)
    }

    /// the synthetic decision on deadline expiry or disconnect:
    /// check when checking is free, fold when facing a bet
    pub fn passive(&self) -> Action {
        if self.to_call() > 0 {
            Action::Fold
        } else {
            Action::Check
        }
    }

    /// the wire action surface available to the acting seat
    pub fn legal(&self) -> Vec<Verb> {
        assert!(!self.complete, "no legal actions in a complete hand");
        let i = self.actor;
        let to_call = self.ledger.to_call(i);
        let stack = self.seats[i].stack();
        let may_raise = stack > to_call && !self.seats[i].acted();
        let mut verbs = vec![Verb::Fold];
        verbs.push(if to_call == 0 { Verb::Check } else { Verb::Call });
        if may_raise {
            verbs.push(Verb::Raise);
        }
        if stack <= to_call || may_raise {
            verbs.push(Verb::Allin);
        }
        verbs
    }
}

impl Game {
    pub fn hand(&self) -> u64 {
        self.hand
    }
    pub fn street(&self) -> Street {
        self.board.street()
    }
    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn pot(&self) -> Chips {
        self.ledger.pot()
    }
    /// the current bet to match, i.e. the highest in-round contribution
    pub fn bet(&self) -> Chips {
        self.ledger.top()
    }
    pub fn is_complete(&self) -> bool {
        self.complete
    }
    /// ring position of the acting seat, None once the hand is complete
    pub fn actor(&self) -> Option<Position> {
        (!self.complete).then(|| self.seats[self.actor].position())
    }
    pub fn to_call(&self) -> Chips {
        self.ledger.to_call(self.actor)
    }
    /// minimum legal total when opening the betting
    pub fn min_bet(&self) -> Chips {
        self.bblind
    }
    /// minimum legal raise-to total when facing a bet
    pub fn min_raise_to(&self) -> Chips {
        self.bet() + self.min_raise
    }
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }
    pub fn seat_views(&self) -> Vec<SeatView> {
        self.seats
            .iter()
            .enumerate()
            .map(|(i, s)| SeatView {
                seat: s.position(),
                name: s.name().to_string(),
                chips: s.stack(),
                bet: self.ledger.round(i),
                folded: s.state() == State::Folding,
                all_in: s.state() == State::Shoving,
            })
            .collect()
    }
    pub fn update(&self) -> Event {
        Event::GameUpdate {
            hand: self.hand,
            pot: self.ledger.pot(),
            seats: self.seat_views(),
        }
    }
}

impl Game {
    fn n(&self) -> usize {
        self.seats.len()
    }
    fn next(&self, i: usize) -> usize {
        (i + 1) % self.n()
    }
    fn survivors(&self) -> usize {
        self.seats.iter().filter(|s| s.state().is_active()).count()
    }

    fn hand_start(&self) -> Event {
        Event::HandStart {
            hand: self.hand,
            button: self.seats[self.dealer].position(),
            sblind: self.sblind,
            bblind: self.bblind,
            seats: self.seat_views(),
            holes: self
                .seats
                .iter()
                .map(|s| (s.position(), s.hole()))
                .collect(),
        }
    }

    fn post(&mut self, i: usize, blind: Chips, verb: Verb) -> Event {
        let pay = std::cmp::min(blind, self.seats[i].stack());
        self.pay(i, pay);
        Event::PlayerAction {
            hand: self.hand,
            street: Street::Pref,
            seat: self.seats[i].position(),
            name: self.seats[i].name().to_string(),
            verb,
            paid: pay,
            bet: self.ledger.round(i),
            stack: self.seats[i].stack(),
            pot: self.ledger.pot(),
        }
    }

    fn validate(&self, i: usize, action: &Action) -> Result<(), ActionError> {
        let illegal = |s: &str| Err(ActionError::Illegal(s.to_string()));
        let to_call = self.ledger.to_call(i);
        let stack = self.seats[i].stack();
        match *action {
            Action::Fold => Ok(()),
            Action::Check if to_call == 0 => Ok(()),
            Action::Check => illegal("cannot check facing a bet"),
            Action::Call if to_call > 0 => Ok(()),
            Action::Call => illegal("nothing to call"),
            Action::Shove => {
                let total = self.ledger.round(i) + stack;
                if total <= self.bet() || !self.seats[i].acted() {
                    Ok(())
                } else {
                    illegal("betting round not reopened")
                }
            }
            Action::Raise(total) => {
                if stack <= to_call {
                    return illegal("stack covers at most a call");
                }
                if self.seats[i].acted() {
                    return illegal("betting round not reopened");
                }
                if total <= self.bet() {
                    return illegal("raise must exceed the current bet");
                }
                let pay = total - self.ledger.round(i);
                if pay > stack {
                    return illegal("raise exceeds stack");
                }
                if total - self.bet() < self.min_raise && pay < stack {
                    return illegal("raise below the minimum");
                }
                Ok(())
            }
        }
    }

    /// returns the chips the action moved into the pot
    fn execute(&mut self, i: usize, action: Action) -> Chips {
        match action {
            Action::Fold => {
                self.seats[i].fold();
                0
            }
            Action::Check => {
                self.seats[i].set_acted();
                0
            }
            Action::Call => {
                let pay = std::cmp::min(self.ledger.to_call(i), self.seats[i].stack());
                self.pay(i, pay);
                self.seats[i].set_acted();
                pay
            }
            Action::Raise(total) => {
                let pay = total - self.ledger.round(i);
                self.raise_to(i, total, pay);
                pay
            }
            Action::Shove => {
                let pay = self.seats[i].stack();
                let total = self.ledger.round(i) + pay;
                if total > self.bet() {
                    self.raise_to(i, total, pay);
                } else {
                    self.pay(i, pay);
                    self.seats[i].set_acted();
                }
                pay
            }
        }
    }

    fn pay(&mut self, i: usize, amount: Chips) {
        self.seats[i].spend(amount);
        self.ledger.contribute(i, amount);
    }

    fn raise_to(&mut self, i: usize, total: Chips, pay: Chips) {
        let bump = total - self.bet();
        self.pay(i, pay);
        if bump >= self.min_raise {
            self.min_raise = bump;
            for j in 0..self.n() {
                if j != i {
                    self.seats[j].reset_acted();
                }
            }
        }
        self.aggressor = Some(i);
        self.seats[i].set_acted();
    }

    /// drive the machine forward until a seat must act or the hand ends
    fn advance(&mut self, events: &mut Vec<Event>) -> Result<(), ActionError> {
        loop {
            if self.survivors() == 1 {
                return self.concede(events);
            }
            if !self.round_over() {
                self.actor = self.next_actor(self.actor);
                return Ok(());
            }
            self.ledger.sweep();
            for seat in self.seats.iter_mut() {
                seat.reset_acted();
            }
            self.min_raise = self.bblind;
            if self.street() == Street::Rive {
                return self.settle(events);
            }
            self.reveal(events);
            self.actor = self.dealer;
        }
    }

    fn round_over(&self) -> bool {
        let bettors = (0..self.n())
            .filter(|i| self.seats[*i].state() == State::Betting)
            .collect::<Vec<usize>>();
        match bettors.len() {
            0 => true,
            // a lone bettor cannot be raised, only asked to match an all in
            1 => self.ledger.round(bettors[0]) == self.bet(),
            _ => bettors
                .iter()
                .all(|i| self.seats[*i].acted() && self.ledger.round(*i) == self.bet()),
        }
    }

    fn needs_action(&self, j: usize) -> bool {
        self.seats[j].state() == State::Betting
            && (!self.seats[j].acted() || self.ledger.round(j) < self.bet())
    }

    fn next_actor(&self, from: usize) -> usize {
        (1..=self.n())
            .map(|k| (from + k) % self.n())
            .find(|j| self.needs_action(*j))
            .expect("open round implies a seat needs action")
    }

    /// burn one card and deal the next street
    fn reveal(&mut self, events: &mut Vec<Event>) {
        self.deck.burn();
        let street = self.street().next();
        for _ in 0..street.n_revealed() {
            self.board.add(self.deck.draw());
        }
        events.push(Event::StreetChange {
            hand: self.hand,
            street,
            board: self.board.cards().to_vec(),
        });
    }

    /// everyone else folded: the last seat standing takes the pot unseen
    fn concede(&mut self, events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.ledger.sweep();
        let i = (0..self.n())
            .find(|i| self.seats[*i].state().is_active())
            .expect("exactly one survivor");
        let pot = self.ledger.pot();
        self.seats[i].win(pot);
        self.complete = true;
        events.push(Event::HandResult {
            hand: self.hand,
            board: self.board.cards().to_vec(),
            winners: vec![Award {
                seat: self.seats[i].position(),
                name: self.seats[i].name().to_string(),
                amount: pot,
                hole: None,
                label: None,
            }],
            showdown: Vec::new(),
        });
        Ok(())
    }

    /// showdown: build side pots, award each to its best eligible hand
    fn settle(&mut self, events: &mut Vec<Event>) -> Result<(), ActionError> {
        let folded = self
            .seats
            .iter()
            .map(|s| s.state() == State::Folding)
            .collect::<Vec<bool>>();
        let board = Hand::from(&self.board);
        let strengths = self
            .seats
            .iter()
            .map(|s| Strength::from(Hand::add(Hand::from(s.hole()), board)))
            .collect::<Vec<Strength>>();
        let pots = self.ledger.pots(&folded);
        if pots.iter().any(|p| p.eligible.is_empty()) {
            return Err(ActionError::Fatal("pot with no eligible winner".to_string()));
        }
        let rewards = Showdown::new(pots, strengths.clone(), self.dealer).settle();
        if rewards.iter().sum::<Chips>() != self.ledger.pot() {
            return Err(ActionError::Fatal(
                "settlement does not conserve chips".to_string(),
            ));
        }
        for (i, reward) in rewards.iter().enumerate() {
            self.seats[i].win(*reward);
        }
        let order = self.reveal_order();
        let winners = order
            .iter()
            .copied()
            .filter(|i| rewards[*i] > 0)
            .map(|i| Award {
                seat: self.seats[i].position(),
                name: self.seats[i].name().to_string(),
                amount: rewards[i],
                hole: Some(self.seats[i].hole()),
                label: Some(strengths[i].label()),
            })
            .collect::<Vec<Award>>();
        let showdown = order
            .iter()
            .copied()
            .filter(|i| rewards[*i] == 0 && self.seats[*i].state().is_active())
            .map(|i| Reveal {
                seat: self.seats[i].position(),
                name: self.seats[i].name().to_string(),
                hole: self.seats[i].hole(),
                label: strengths[i].label(),
            })
            .collect::<Vec<Reveal>>();
        self.complete = true;
        events.push(Event::HandResult {
            hand: self.hand,
            board: self.board.cards().to_vec(),
            winners,
            showdown,
        });
        Ok(())
    }

    /// last aggressor first, then clockwise; left of dealer when checked down
    fn reveal_order(&self) -> Vec<usize> {
        let first = self.aggressor.unwrap_or_else(|| self.next(self.dealer));
        (0..self.n()).map(|k| (first + k) % self.n()).collect()
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for seat in self.seats.iter() {
            write!(f, "{} ", seat)?;
        }
        write!(f, "@ {:>6} {} {}", self.pot(), self.board, self.street())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Shuffler;

    fn players(stacks: &[Chips]) -> Vec<(Position, String, Chips)> {
        stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (i, format!("bot-{}", i), *s))
            .collect()
    }

    fn game(stacks: &[Chips]) -> Game {
        let deck = Shuffler::new(99).deck(0);
        let (game, _) = Game::deal(1, 0, players(stacks), 5, 10, deck).unwrap();
        game
    }

    fn act(game: &mut Game, action: Action) -> Vec<Event> {
        let actor = game.actor().unwrap();
        game.apply(actor, action, Verb::from(action)).unwrap()
    }

    #[test]
    fn blinds_posted_and_first_actor_left_of_bb() {
        let game = game(&[1000, 1000, 1000, 1000]);
        assert_eq!(game.pot(), 15);
        assert_eq!(game.bet(), 10);
        // seat 0 dealer, 1 sb, 2 bb, 3 first to act
        assert_eq!(game.actor(), Some(3));
        assert_eq!(game.to_call(), 10);
    }

    #[test]
    fn heads_up_dealer_posts_small_and_acts_first() {
        let game = game(&[1000, 1000]);
        assert_eq!(game.pot(), 15);
        assert_eq!(game.actor(), Some(0));
        assert_eq!(game.to_call(), 5);
    }

    #[test]
    fn everyone_folds_to_big_blind() {
        let mut game = game(&[1000, 1000, 1000, 1000]);
        let mut last = Vec::new();
        for _ in 0..3 {
            last = act(&mut game, Action::Fold);
        }
        assert!(game.is_complete());
        let result = last
            .iter()
            .find_map(|e| match e {
                Event::HandResult { winners, .. } => Some(winners.clone()),
                _ => None,
            })
            .expect("hand result emitted");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].seat, 2);
        assert_eq!(result[0].amount, 15);
        assert!(result[0].hole.is_none());
        assert_eq!(game.seats()[2].stack(), 1005);
    }

    #[test]
    fn chip_conservation() {
        let mut game = game(&[500, 800, 1000]);
        while !game.is_complete() {
            let action = match game.legal().contains(&Verb::Check) {
                true => Action::Check,
                false => Action::Call,
            };
            act(&mut game, action);
        }
        let total = game.seats().iter().map(|s| s.stack()).sum::<Chips>();
        assert_eq!(total, 2300);
    }

    #[test]
    fn bb_gets_option_after_limps() {
        let mut game = game(&[1000, 1000, 1000]);
        // seat 0 dealer, 1 sb, 2 bb; dealer acts first preflop
        assert_eq!(game.actor(), Some(0));
        act(&mut game, Action::Call);
        act(&mut game, Action::Call);
        // bb may still raise
        assert_eq!(game.actor(), Some(2));
        assert!(game.legal().contains(&Verb::Raise));
        act(&mut game, Action::Check);
        // flop dealt, sb first to act
        assert_eq!(game.street(), Street::Flop);
        assert_eq!(game.actor(), Some(1));
    }

    #[test]
    fn min_raise_enforced() {
        let mut game = game(&[1000, 1000, 1000]);
        let actor = game.actor().unwrap();
        // bet 10, min raise 10: raise-to must be at least 20
        let err = game.apply(actor, Action::Raise(15), Verb::Raise);
        assert!(matches!(err, Err(ActionError::Illegal(_))));
        assert!(game.apply(actor, Action::Raise(20), Verb::Raise).is_ok());
        assert_eq!(game.min_raise_to(), 30);
    }

    #[test]
    fn wrong_seat_rejected() {
        let mut game = game(&[1000, 1000, 1000]);
        let actor = game.actor().unwrap();
        let other = (actor + 1) % 3;
        let err = game.apply(other, Action::Fold, Verb::Fold);
        assert_eq!(err, Err(ActionError::NotYourTurn));
    }

    #[test]
    fn short_all_in_does_not_reopen() {
        // seat 3 opens to 100, seat 4 shoves 150 short, seat 0 calls;
        // back on seat 3 the round is locked
        let mut game = game(&[1000, 1000, 1000, 1000, 150]);
        assert_eq!(game.actor(), Some(3));
        act(&mut game, Action::Raise(100));
        assert_eq!(game.actor(), Some(4));
        act(&mut game, Action::Shove);
        assert_eq!(game.bet(), 150);
        assert_eq!(game.actor(), Some(0));
        act(&mut game, Action::Call);
        act(&mut game, Action::Fold); // sb
        act(&mut game, Action::Fold); // bb
        assert_eq!(game.actor(), Some(3));
        let legal = game.legal();
        assert!(legal.contains(&Verb::Call));
        assert!(!legal.contains(&Verb::Raise));
        assert!(!legal.contains(&Verb::Allin));
        let err = game.apply(3, Action::Raise(250), Verb::Raise);
        assert!(matches!(err, Err(ActionError::Illegal(_))));
    }

    #[test]
    fn full_raise_reopens() {
        let mut game = game(&[1000, 1000, 1000, 1000, 1000]);
        act(&mut game, Action::Raise(100)); // seat 3
        act(&mut game, Action::Raise(250)); // seat 4, full raise of 150
        act(&mut game, Action::Fold); // seat 0
        act(&mut game, Action::Fold); // sb
        act(&mut game, Action::Fold); // bb
        // seat 3 faces a full raise and may reraise
        assert_eq!(game.actor(), Some(3));
        assert!(game.legal().contains(&Verb::Raise));
        assert_eq!(game.min_raise_to(), 400);
    }

    #[test]
    fn timeout_policy_is_fold_facing_bet_else_check() {
        let mut game = game(&[1000, 1000, 1000]);
        assert_eq!(game.passive(), Action::Fold);
        act(&mut game, Action::Call);
        act(&mut game, Action::Call);
        assert_eq!(game.passive(), Action::Check);
    }

    #[test]
    fn all_in_blinds_run_out_the_board() {
        let deck = Shuffler::new(7).deck(0);
        let (game, events) = Game::deal(1, 0, players(&[5, 6]), 5, 10, deck).unwrap();
        assert!(game.is_complete());
        assert!(events.iter().any(|e| matches!(e, Event::HandResult { .. })));
        let total = game.seats().iter().map(|s| s.stack()).sum::<Chips>();
        assert_eq!(total, 11);
    }

    #[test]
    fn accepted_actions_always_advertised() {
        // random-ish walk: every applied action's verb was in legal()
        let mut game = game(&[300, 400, 500, 600]);
        let script = [
            Action::Call,
            Action::Raise(30),
            Action::Call,
            Action::Call,
            Action::Call,
            Action::Check,
        ];
        for action in script {
            if game.is_complete() {
                break;
            }
            let legal = game.legal();
            let verb = Verb::from(action);
            if legal.contains(&verb) {
                act(&mut game, action);
            }
        }
    }
}
