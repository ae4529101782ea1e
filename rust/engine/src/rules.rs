use crate::errors::GameError;
use crate::game::{Phase, Seats, MAX_SEATS};
use crate::player::{Action, ActionKind as A, Seat};

/// Read-only snapshot of everything the validator looks at.
#[derive(Debug, Clone, Copy)]
pub struct Betting<'a> {
    pub seats: &'a Seats,
    pub phase: Phase,
    pub in_hand: bool,
    /// Seat index holding the turn
    pub turn: usize,
    pub highest_wager: u32,
    /// Smallest legal raise increment: the big blind, or the last full raise
    pub min_increment: u32,
    /// Seats facing only a short all-in since they last acted; they may
    /// call or fold but not raise
    pub raise_closed: [bool; MAX_SEATS],
}

impl Betting<'_> {
    pub fn call_amount(&self, seat: &Seat) -> u32 {
        self.highest_wager.saturating_sub(seat.wager())
    }

    /// Whether the seat may put in more than the call.
    pub fn can_raise(&self, seat: &Seat) -> bool {
        self.seats
            .find(seat.id())
            .is_none_or(|i| !self.raise_closed[i])
    }
}

/// What an accepted action does to the seat's chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips moved to match the highest wager
    Call(u32),
    /// Call-amount plus the raise increment
    Raise { call: u32, increment: u32 },
    /// The whole stack
    AllIn(u32),
}

impl ValidatedAction {
    /// Chips leaving the stack.
    pub fn chips(&self) -> u32 {
        match *self {
            ValidatedAction::Fold | ValidatedAction::Check => 0,
            ValidatedAction::Call(c) | ValidatedAction::AllIn(c) => c,
            ValidatedAction::Raise { call, increment } => call + increment,
        }
    }
}

/// Validates a submitted action against the table without touching it.
///
/// Checks run in order and the first failure is returned:
/// 1. the actor is seated, still in the hand and holds the turn
/// 2. a hand is running and has not reached showdown
/// 3. the amount fits the action kind
///
/// # Errors
///
/// - [`GameError::InvalidPlayer`] - actor not seated, or already folded
/// - [`GameError::OutOfTurn`] - actor does not hold the turn
/// - [`GameError::InvalidGameState`] - no hand running, or showdown reached
/// - [`GameError::InvalidAmount`] - amount does not match the kind
/// - [`GameError::InsufficientChips`] - the stack cannot cover the action
/// - [`GameError::ActionNotAllowed`] - check facing a bet, call with nothing
///   to call, or a raise when a short all-in did not reopen the betting
///
/// # Examples
///
/// ```
/// use holdem_engine::engine::Engine;
/// use holdem_engine::player::Action;
/// use holdem_engine::rules::{validate, ValidatedAction};
///
/// let mut engine = Engine::new(5, 10, Some(7));
/// engine.sit(0, 1, 1000).unwrap();
/// engine.sit(1, 2, 1000).unwrap();
/// engine.start_hand().unwrap();
///
/// // heads-up: the button posts the small blind and acts first
/// let betting = engine.betting();
/// assert_eq!(validate(&betting, &Action::call(1, 5)), Ok(ValidatedAction::Call(5)));
/// assert!(validate(&betting, &Action::check(1)).is_err());
/// assert!(validate(&betting, &Action::check(2)).is_err());
/// ```
pub fn validate(table: &Betting<'_>, action: &Action) -> Result<ValidatedAction, GameError> {
    let (index, seat) = table
        .seats
        .iter()
        .find(|(_, s)| s.id() == action.actor)
        .ok_or(GameError::InvalidPlayer {
            player: action.actor,
            reason: "not seated",
        })?;
    if seat.is_folded() {
        return Err(GameError::InvalidPlayer {
            player: action.actor,
            reason: "already folded",
        });
    }
    if table.turn != index {
        return Err(GameError::OutOfTurn {
            expected: table.turn,
            actual: index,
        });
    }

    if !table.in_hand || table.phase == Phase::Showdown {
        return Err(GameError::InvalidGameState("no betting round in progress"));
    }

    let amount = action.amount;
    let stack = seat.stack();
    let to_call = table.call_amount(seat);
    match action.kind {
        A::Fold => {
            expect_zero(amount)?;
            Ok(ValidatedAction::Fold)
        }
        A::Check => {
            expect_zero(amount)?;
            if to_call > 0 {
                return Err(GameError::ActionNotAllowed("cannot check facing a bet"));
            }
            Ok(ValidatedAction::Check)
        }
        A::Call => {
            if to_call == 0 {
                return Err(GameError::ActionNotAllowed("nothing to call"));
            }
            if amount != to_call {
                return Err(GameError::InvalidAmount {
                    amount,
                    expected: to_call.to_string(),
                });
            }
            if stack < to_call {
                return Err(GameError::InsufficientChips {
                    needed: to_call,
                    available: stack,
                });
            }
            Ok(ValidatedAction::Call(to_call))
        }
        A::Raise => {
            if table.raise_closed[index] {
                return Err(GameError::ActionNotAllowed(
                    "betting was not reopened after a short all-in",
                ));
            }
            if amount == 0 {
                return Err(GameError::InvalidAmount {
                    amount,
                    expected: "> 0".to_string(),
                });
            }
            let total = to_call.saturating_add(amount);
            if total > stack {
                return Err(GameError::InsufficientChips {
                    needed: total,
                    available: stack,
                });
            }
            if total < min_raise(table, seat) {
                return Err(GameError::InvalidAmount {
                    amount,
                    expected: format!(">= {}", table.min_increment),
                });
            }
            Ok(ValidatedAction::Raise {
                call: to_call,
                increment: amount,
            })
        }
        A::AllIn => {
            if stack == 0 {
                return Err(GameError::InsufficientChips {
                    needed: 1,
                    available: 0,
                });
            }
            if amount != stack {
                return Err(GameError::InvalidAmount {
                    amount,
                    expected: stack.to_string(),
                });
            }
            if stack > to_call && table.raise_closed[index] {
                return Err(GameError::ActionNotAllowed(
                    "betting was not reopened after a short all-in",
                ));
            }
            Ok(ValidatedAction::AllIn(stack))
        }
    }
}

fn expect_zero(amount: u32) -> Result<(), GameError> {
    if amount == 0 {
        Ok(())
    } else {
        Err(GameError::InvalidAmount {
            amount,
            expected: "0".to_string(),
        })
    }
}

/// Action kinds the seat could submit right now, in a fixed order.
pub fn legal_actions(table: &Betting<'_>, seat: &Seat) -> Vec<A> {
    let mut actions = Vec::new();
    if seat.is_folded() {
        return actions;
    }
    let to_call = table.call_amount(seat);
    let stack = seat.stack();
    actions.push(A::Fold);
    if to_call == 0 {
        actions.push(A::Check);
    }
    if to_call > 0 && stack >= to_call {
        actions.push(A::Call);
    }
    let can_raise = table.can_raise(seat);
    if can_raise && stack >= min_raise(table, seat) {
        actions.push(A::Raise);
    }
    if stack > 0 && (can_raise || stack <= to_call) {
        actions.push(A::AllIn);
    }
    actions
}

/// Chips the seat must commit for the smallest legal raise: the call-amount
/// plus the minimum increment.
pub fn min_raise(table: &Betting<'_>, seat: &Seat) -> u32 {
    table
        .call_amount(seat)
        .saturating_add(table.min_increment)
}

/// Total round wager after the smallest legal raise.
pub fn min_raise_to(table: &Betting<'_>) -> u32 {
    table.highest_wager.saturating_add(table.min_increment)
}

/// Most the seat can commit: its whole stack.
pub fn max_raise(seat: &Seat) -> u32 {
    seat.stack()
}
