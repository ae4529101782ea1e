use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::config::TableConfig;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{Phase, Seats, MAX_SEATS};
use crate::hand::{compare_hands, evaluate_seat, HandResult};
use crate::logger::{EventSink, HandEvent};
use crate::player::{Action, ActionKind, PlayerId, Seat};
use crate::rules::{self, Betting, ValidatedAction};

/// How a finished hand was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandOutcome {
    pub hand_number: u64,
    /// Chips that were in the pot when the hand ended
    pub pot: u32,
    pub board: Vec<Card>,
    /// Winning seat indices in seat order
    pub winners: Vec<usize>,
    /// `(seat, chips)` per winner, in seat order
    pub payouts: Vec<(usize, u32)>,
    /// Best hand of every seat that reached showdown; empty when the hand
    /// ended by folds
    pub hands: Vec<(usize, HandResult)>,
    pub ended_by_fold: bool,
}

/// Table state machine for multiplayer no-limit Texas Hold'em.
///
/// Owns the seats, the pot and the draw pile, and moves one hand through
/// Preflop, Flop, Turn, River and Showdown. Every submitted action goes
/// through [`rules::validate`] first; a rejected action leaves the table
/// untouched. The engine is synchronous and must not be driven
/// concurrently for the same table.
///
/// `pot` holds every chip committed during the hand, including the current
/// round's wagers, so `stacks + pot` is constant for the whole hand.
///
/// # Examples
///
/// ```
/// use holdem_engine::engine::Engine;
/// use holdem_engine::game::Phase;
/// use holdem_engine::player::Action;
///
/// let mut engine = Engine::new(5, 10, Some(42));
/// engine.sit(0, 1, 1000).unwrap();
/// engine.sit(1, 2, 1000).unwrap();
/// engine.start_hand().unwrap();
/// assert_eq!(engine.pot(), 15);
///
/// engine.submit(Action::call(1, 5)).unwrap();
/// engine.submit(Action::check(2)).unwrap();
/// assert_eq!(engine.phase(), Phase::Flop);
/// assert_eq!(engine.board().len(), 3);
/// ```
pub struct Engine {
    seats: Seats,
    small_blind: u32,
    big_blind: u32,
    starting_stack: u32,
    seed: Option<u64>,
    /// Shuffler; each hand deals from a fresh copy
    deck: Deck,
    draw: Deck,
    board: Vec<Card>,
    phase: Phase,
    in_hand: bool,
    button: Option<usize>,
    turn: usize,
    pot: u32,
    highest_wager: u32,
    last_raise: u32,
    actions_this_round: usize,
    acted: [bool; MAX_SEATS],
    /// Seats that acted before a short all-in and may only call or fold
    raise_closed: [bool; MAX_SEATS],
    hand_number: u64,
    hand_total: u32,
    outcome: Option<HandOutcome>,
    sink: Option<Box<dyn EventSink>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("seats", &self.seats)
            .field("blinds", &(self.small_blind, self.big_blind))
            .field("board", &self.board)
            .field("phase", &self.phase)
            .field("in_hand", &self.in_hand)
            .field("button", &self.button)
            .field("turn", &self.turn)
            .field("pot", &self.pot)
            .field("highest_wager", &self.highest_wager)
            .field("hand_number", &self.hand_number)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(small_blind: u32, big_blind: u32, seed: Option<u64>) -> Self {
        let deck = match seed {
            Some(s) => Deck::new_with_seed(s),
            None => Deck::from_entropy(),
        };
        Self {
            seats: Seats::new(),
            small_blind,
            big_blind,
            starting_stack: TableConfig::default().starting_stack,
            seed,
            deck,
            draw: Deck::stacked(Vec::new()),
            board: Vec::with_capacity(5),
            phase: Phase::Preflop,
            in_hand: false,
            button: None,
            turn: 0,
            pot: 0,
            highest_wager: 0,
            last_raise: big_blind,
            actions_this_round: 0,
            acted: [false; MAX_SEATS],
            raise_closed: [false; MAX_SEATS],
            hand_number: 0,
            hand_total: 0,
            outcome: None,
            sink: None,
        }
    }

    pub fn from_config(cfg: &TableConfig) -> Self {
        let mut engine = Self::new(cfg.small_blind, cfg.big_blind, cfg.seed);
        engine.starting_stack = cfg.starting_stack;
        engine
    }

    /// Routes hand events to `sink`, replacing any previous one.
    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = Some(sink);
    }

    pub fn take_event_sink(&mut self) -> Option<Box<dyn EventSink>> {
        self.sink.take()
    }

    // ---- seating -------------------------------------------------------

    /// Seats a player between hands.
    pub fn sit(&mut self, seat: usize, id: PlayerId, stack: u32) -> Result<(), GameError> {
        if self.in_hand {
            return Err(GameError::InvalidGameState("cannot sit down during a hand"));
        }
        let room = u32::MAX - self.total_chips();
        if stack > room {
            return Err(GameError::InvalidAmount {
                amount: stack,
                expected: format!("at most {} for this table", room),
            });
        }
        self.seats.sit(seat, Seat::new(id, stack))?;
        tracing::info!(seat, player = id, stack, "player seated");
        Ok(())
    }

    /// Seats a player with the configured starting stack.
    pub fn join(&mut self, seat: usize, id: PlayerId) -> Result<(), GameError> {
        self.sit(seat, id, self.starting_stack)
    }

    /// Removes a player between hands and returns their seat.
    pub fn leave(&mut self, id: PlayerId) -> Result<Seat, GameError> {
        if self.in_hand {
            return Err(GameError::InvalidGameState("cannot leave during a hand"));
        }
        let seat = self.seats.remove(id).ok_or(GameError::InvalidPlayer {
            player: id,
            reason: "not seated",
        })?;
        tracing::info!(player = id, stack = seat.stack(), "player left");
        Ok(seat)
    }

    // ---- queries -------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn in_hand(&self) -> bool {
        self.in_hand
    }
    /// True once a started hand has been settled.
    pub fn is_hand_complete(&self) -> bool {
        !self.in_hand && self.outcome.is_some()
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn highest_wager(&self) -> u32 {
        self.highest_wager
    }
    pub fn actions_this_round(&self) -> usize {
        self.actions_this_round
    }
    pub fn board(&self) -> &[Card] {
        &self.board
    }
    pub fn button(&self) -> Option<usize> {
        self.button
    }
    pub fn blinds(&self) -> (u32, u32) {
        (self.small_blind, self.big_blind)
    }
    pub fn starting_stack(&self) -> u32 {
        self.starting_stack
    }
    pub fn hand_number(&self) -> u64 {
        self.hand_number
    }
    pub fn outcome(&self) -> Option<&HandOutcome> {
        self.outcome.as_ref()
    }
    pub fn deck_remaining(&self) -> usize {
        self.draw.remaining()
    }

    /// Seat index holding the turn while a hand is running.
    pub fn turn(&self) -> Option<usize> {
        self.in_hand.then_some(self.turn)
    }

    pub fn seat_to_act(&self) -> Option<&Seat> {
        self.turn().and_then(|i| self.seats.get(i))
    }

    pub fn seat(&self, index: usize) -> Option<&Seat> {
        self.seats.get(index)
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.seats.find(id)
    }

    pub fn seats(&self) -> impl Iterator<Item = (usize, &Seat)> {
        self.seats.iter()
    }

    pub fn occupied_seats(&self) -> Vec<usize> {
        self.seats.iter().map(|(i, _)| i).collect()
    }

    /// Chips on the table: every stack plus the pot. Seating keeps this
    /// within `u32`.
    pub fn total_chips(&self) -> u32 {
        self.seats.iter().map(|(_, s)| s.stack()).sum::<u32>() + self.pot
    }

    pub fn betting(&self) -> Betting<'_> {
        Betting {
            seats: &self.seats,
            phase: self.phase,
            in_hand: self.in_hand,
            turn: self.turn,
            highest_wager: self.highest_wager,
            min_increment: self.last_raise,
            raise_closed: self.raise_closed,
        }
    }

    pub fn legal_actions(&self, seat: usize) -> Vec<ActionKind> {
        match self.seats.get(seat) {
            Some(s) if self.in_hand && self.phase != Phase::Showdown => {
                rules::legal_actions(&self.betting(), s)
            }
            _ => Vec::new(),
        }
    }

    /// Chips the seat must commit for the smallest legal raise.
    pub fn min_raise(&self, seat: usize) -> Option<u32> {
        self.seats
            .get(seat)
            .map(|s| rules::min_raise(&self.betting(), s))
    }

    /// Round wager after the smallest legal raise.
    pub fn min_raise_to(&self) -> u32 {
        rules::min_raise_to(&self.betting())
    }

    pub fn max_raise(&self, seat: usize) -> Option<u32> {
        self.seats.get(seat).map(rules::max_raise)
    }

    // ---- hand lifecycle ------------------------------------------------

    /// Shuffles a fresh 52-card deck and starts the next hand.
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        self.check_can_start()?;
        self.deck.shuffle();
        let pile = self.deck.clone();
        self.begin_hand(pile)
    }

    /// Starts the next hand dealing from `deck` exactly as given.
    pub fn start_hand_with_deck(&mut self, deck: Deck) -> Result<(), GameError> {
        self.check_can_start()?;
        self.begin_hand(deck)
    }

    fn check_can_start(&self) -> Result<usize, GameError> {
        if self.in_hand {
            return Err(GameError::InvalidGameState("hand already in progress"));
        }
        let funded = self.seats.iter().filter(|(_, s)| s.stack() > 0).count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers(funded));
        }
        Ok(funded)
    }

    fn begin_hand(&mut self, pile: Deck) -> Result<(), GameError> {
        let funded = self.check_can_start()?;
        // hole cards, three burns and five board cards
        let needed = funded * 2 + 8;
        if pile.remaining() < needed {
            return Err(GameError::DeckExhausted);
        }

        let button = match self.button {
            Some(b) => self.seats.next_after(b, |s| s.stack() > 0),
            None => self.seats.next_after(MAX_SEATS - 1, |s| s.stack() > 0),
        }
        .ok_or(GameError::NotEnoughPlayers(funded))?;

        for (_, seat) in self.seats.iter_mut() {
            seat.reset_for_new_hand();
            if seat.stack() == 0 {
                // sitting out
                seat.fold();
            }
        }
        self.draw = pile;
        self.board.clear();
        self.button = Some(button);
        self.phase = Phase::Preflop;
        self.in_hand = true;
        self.pot = 0;
        self.highest_wager = 0;
        self.last_raise = self.big_blind;
        self.actions_this_round = 0;
        self.acted = [false; MAX_SEATS];
        self.raise_closed = [false; MAX_SEATS];
        self.outcome = None;
        self.hand_number += 1;
        self.hand_total = self.total_chips();

        tracing::info!(
            hand = self.hand_number,
            button,
            players = funded,
            "starting hand"
        );
        self.emit(HandEvent::HandStarted {
            hand_number: self.hand_number,
            button,
            seed: self.seed,
        });

        let order = self.seats.order_after(button, |s| !s.is_folded());
        for _ in 0..2 {
            for &i in &order {
                let card = self.draw.deal_card().ok_or(GameError::DeckExhausted)?;
                if let Some(seat) = self.seats.get_mut(i) {
                    seat.give_card(card).map_err(GameError::CorruptState)?;
                }
            }
        }
        self.emit(HandEvent::HoleCardsDealt {
            cards: order.len() * 2,
        });

        // Heads-up the button posts the small blind and acts first preflop.
        let (sb, bb, first) = if order.len() == 2 {
            (button, order[0], button)
        } else {
            (order[0], order[1], order[2 % order.len()])
        };
        self.post_blind(sb, self.small_blind)?;
        self.post_blind(bb, self.big_blind)?;
        self.highest_wager = self.big_blind;

        self.turn = if self.seats.get(first).is_some_and(Seat::can_act) {
            first
        } else {
            self.seats.next_after(first, Seat::can_act).unwrap_or(first)
        };

        if self.round_complete() {
            self.finish_round()?;
        }
        Ok(())
    }

    fn post_blind(&mut self, index: usize, blind: u32) -> Result<(), GameError> {
        let seat = self
            .seats
            .get_mut(index)
            .ok_or_else(|| GameError::CorruptState(format!("blind seat {} is empty", index)))?;
        // a short stack posts what it has
        let amount = blind.min(seat.stack());
        seat.bet(amount).map_err(GameError::CorruptState)?;
        let player = seat.id();
        self.pot += amount;
        tracing::debug!(seat = index, amount, "blind posted");
        self.emit(HandEvent::BlindPosted {
            seat: index,
            player,
            amount,
        });
        Ok(())
    }

    /// Validates and applies one action. This is the only way players
    /// change the table.
    ///
    /// Returns the outcome when the action ended the hand.
    ///
    /// # Errors
    ///
    /// Any [`rules::validate`] error, in which case nothing changed. Fatal
    /// errors (see [`GameError::is_fatal`]) mean the table state is corrupt.
    pub fn submit(&mut self, action: Action) -> Result<Option<HandOutcome>, GameError> {
        let validated = rules::validate(&self.betting(), &action)?;
        let index = self.turn;
        let phase = self.phase;

        let seat = self
            .seats
            .get_mut(index)
            .ok_or_else(|| GameError::CorruptState(format!("turn seat {} is empty", index)))?;
        match validated {
            ValidatedAction::Fold => seat.fold(),
            ValidatedAction::Check => {}
            ValidatedAction::Call(_)
            | ValidatedAction::Raise { .. }
            | ValidatedAction::AllIn(_) => {
                let chips = validated.chips();
                seat.bet(chips).map_err(GameError::CorruptState)?;
                self.pot += chips;
                let wager = seat.wager();
                if wager > self.highest_wager {
                    let increment = wager - self.highest_wager;
                    if increment >= self.last_raise {
                        self.last_raise = increment;
                        self.raise_closed = [false; MAX_SEATS];
                    } else {
                        // short all-in: seats that already acted may not re-raise
                        for (closed, &acted) in self.raise_closed.iter_mut().zip(&self.acted) {
                            *closed |= acted;
                        }
                    }
                    self.highest_wager = wager;
                    self.acted = [false; MAX_SEATS];
                }
            }
        }
        self.acted[index] = true;
        self.actions_this_round += 1;

        tracing::debug!(
            seat = index,
            player = action.actor,
            kind = ?action.kind,
            amount = action.amount,
            pot = self.pot,
            "action applied"
        );
        self.emit(HandEvent::PlayerActed {
            seat: index,
            phase,
            action,
        });

        if validated == ValidatedAction::Fold && self.seats.active_count() <= 1 {
            return self.end_by_fold().map(Some);
        }

        if let Some(next) = self.seats.next_after(index, Seat::can_act) {
            self.turn = next;
        }

        if self.round_complete() {
            return self.finish_round();
        }
        Ok(None)
    }

    /// Every seat still in the hand has either acted since the last raise
    /// and matched the highest wager, or is all-in.
    fn round_complete(&self) -> bool {
        self.seats
            .iter()
            .filter(|(_, s)| !s.is_folded())
            .all(|(i, s)| s.is_all_in() || (self.acted[i] && s.wager() == self.highest_wager))
    }

    /// Closes the betting round and deals the following streets. Keeps
    /// dealing without betting while fewer than two seats can still bet.
    fn finish_round(&mut self) -> Result<Option<HandOutcome>, GameError> {
        loop {
            for (_, seat) in self.seats.iter_mut() {
                seat.reset_wager();
            }
            self.highest_wager = 0;
            self.last_raise = self.big_blind;
            self.actions_this_round = 0;
            self.acted = [false; MAX_SEATS];
            self.raise_closed = [false; MAX_SEATS];

            let from = self.phase;
            let next = from.next().ok_or_else(|| {
                GameError::CorruptState("cannot advance past showdown".to_string())
            })?;
            self.phase = next;
            self.emit(HandEvent::PhaseChanged { from, to: next });

            if next == Phase::Showdown {
                return self.showdown().map(Some);
            }

            self.draw.burn_card().ok_or(GameError::DeckExhausted)?;
            let mut dealt = Vec::with_capacity(next.cards_dealt());
            for _ in 0..next.cards_dealt() {
                dealt.push(self.draw.deal_card().ok_or(GameError::DeckExhausted)?);
            }
            self.board.extend(dealt.iter().copied());
            tracing::debug!(phase = ?next, cards = ?dealt, "street dealt");
            self.emit(HandEvent::StreetDealt {
                phase: next,
                cards: dealt,
            });

            let button = self.button.unwrap_or(0);
            if let Some(first) = self.seats.next_after(button, Seat::can_act) {
                self.turn = first;
            }
            if self.seats.actionable_count() >= 2 {
                return Ok(None);
            }
        }
    }

    fn end_by_fold(&mut self) -> Result<HandOutcome, GameError> {
        let winner = self
            .seats
            .iter()
            .find(|(_, s)| !s.is_folded())
            .map(|(i, _)| i)
            .ok_or_else(|| GameError::CorruptState("every seat folded".to_string()))?;
        self.phase = Phase::Showdown;
        let payouts = vec![(winner, self.pot)];
        self.settle(vec![winner], payouts, Vec::new(), true)
    }

    fn showdown(&mut self) -> Result<HandOutcome, GameError> {
        let hands: Vec<(usize, HandResult)> = self
            .seats
            .iter()
            .filter(|(_, s)| !s.is_folded())
            .map(|(i, s)| (i, evaluate_seat(s.hole_cards(), &self.board)))
            .collect();
        let best = hands
            .iter()
            .map(|(_, h)| h)
            .max_by(|a, b| compare_hands(a, b))
            .ok_or_else(|| GameError::CorruptState("showdown without players".to_string()))?;
        let winners: Vec<usize> = hands
            .iter()
            .filter(|(_, h)| compare_hands(h, best).is_eq())
            .map(|&(i, _)| i)
            .collect();
        for (i, h) in &hands {
            tracing::debug!(seat = i, hand = %h.describe(), "showdown hand");
        }
        let shares = split_pot(self.pot, winners.len());
        let payouts = winners.iter().copied().zip(shares).collect();
        self.settle(winners, payouts, hands, false)
    }

    fn settle(
        &mut self,
        winners: Vec<usize>,
        payouts: Vec<(usize, u32)>,
        hands: Vec<(usize, HandResult)>,
        ended_by_fold: bool,
    ) -> Result<HandOutcome, GameError> {
        let pot = self.pot;
        for &(i, amount) in &payouts {
            let seat = self
                .seats
                .get_mut(i)
                .ok_or_else(|| GameError::CorruptState(format!("winner seat {} is empty", i)))?;
            seat.add_chips(amount);
            let player = seat.id();
            tracing::info!(seat = i, player, amount, "pot awarded");
            self.emit(HandEvent::PotAwarded {
                seat: i,
                player,
                amount,
            });
        }
        self.pot = 0;
        self.highest_wager = 0;
        for (_, seat) in self.seats.iter_mut() {
            seat.reset_wager();
        }
        self.in_hand = false;

        let total = self.total_chips();
        if total != self.hand_total {
            return Err(GameError::CorruptState(format!(
                "chips not conserved: started with {}, ended with {}",
                self.hand_total, total
            )));
        }

        let outcome = HandOutcome {
            hand_number: self.hand_number,
            pot,
            board: self.board.clone(),
            winners: winners.clone(),
            payouts,
            hands,
            ended_by_fold,
        };
        tracing::info!(hand = self.hand_number, pot, winners = ?winners, ended_by_fold, "hand complete");
        self.emit(HandEvent::HandEnded {
            pot,
            winners,
            by_fold: ended_by_fold,
        });
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    fn emit(&mut self, event: HandEvent) {
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&event);
        }
    }
}

/// Splits `pot` evenly between `winners`; the indivisible remainder goes to
/// the first winner in seat order.
pub fn split_pot(pot: u32, winners: usize) -> Vec<u32> {
    if winners == 0 {
        return Vec::new();
    }
    let n = winners as u32;
    let mut shares = vec![pot / n; winners];
    shares[0] += pot % n;
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pot_gives_remainder_to_first_winner() {
        assert_eq!(split_pot(101, 2), vec![51, 50]);
        assert_eq!(split_pot(100, 3), vec![34, 33, 33]);
        assert_eq!(split_pot(15, 1), vec![15]);
        assert!(split_pot(10, 0).is_empty());
    }

    #[test]
    fn seating_is_locked_during_a_hand() {
        let mut engine = Engine::new(5, 10, Some(1));
        engine.sit(0, 1, 100).unwrap();
        engine.sit(1, 2, 100).unwrap();
        engine.start_hand().unwrap();
        assert!(matches!(
            engine.sit(2, 3, 100),
            Err(GameError::InvalidGameState(_))
        ));
        assert!(matches!(engine.leave(1), Err(GameError::InvalidGameState(_))));
        assert!(matches!(
            engine.start_hand(),
            Err(GameError::InvalidGameState(_))
        ));
    }

    #[test]
    fn needs_two_funded_seats() {
        let mut engine = Engine::new(5, 10, Some(1));
        engine.sit(0, 1, 100).unwrap();
        engine.sit(1, 2, 0).unwrap();
        assert_eq!(engine.start_hand(), Err(GameError::NotEnoughPlayers(1)));
        assert!(!engine.in_hand());
    }

    #[test]
    fn short_deck_is_rejected_before_anything_changes() {
        let mut engine = Engine::new(5, 10, Some(1));
        engine.sit(0, 1, 100).unwrap();
        engine.sit(1, 2, 100).unwrap();
        let short = Deck::stacked(crate::cards::full_deck()[..5].to_vec());
        assert_eq!(engine.start_hand_with_deck(short), Err(GameError::DeckExhausted));
        assert_eq!(engine.hand_number(), 0);
        assert_eq!(engine.total_chips(), 200);
    }
}
