//! Decision makers and the loop that drives a hand with them.
//!
//! The engine never chooses moves. A [`DecisionMaker`] looks at the table
//! and proposes an [`Action`]; the [`Driver`] is the only thing submitting
//! those proposals, one at a time, through [`Engine::submit`].

use std::collections::BTreeMap;

use crate::engine::{Engine, HandOutcome};
use crate::errors::GameError;
use crate::player::{Action, ActionKind, PlayerId};

/// Anything that can pick an action for a seat: a bot, a UI prompt, a
/// scripted test player.
pub trait DecisionMaker: Send {
    /// Proposes the next action for `player`, who holds the turn. The
    /// proposal may be illegal; the driver reports the rejection and asks
    /// again.
    fn decide(&mut self, engine: &Engine, player: PlayerId) -> Action;

    fn name(&self) -> &str;

    /// Called after a proposal was rejected.
    fn rejected(&mut self, _action: &Action, _error: &GameError) {}
}

/// Checks when it can, otherwise calls, otherwise shoves. Never folds.
#[derive(Debug, Clone, Default)]
pub struct CallingStation;

impl DecisionMaker for CallingStation {
    fn decide(&mut self, engine: &Engine, player: PlayerId) -> Action {
        let Some((index, seat)) = engine
            .seat_of(player)
            .and_then(|i| engine.seat(i).map(|s| (i, s)))
        else {
            return Action::fold(player);
        };
        let legal = engine.legal_actions(index);
        if legal.contains(&ActionKind::Check) {
            Action::check(player)
        } else if legal.contains(&ActionKind::Call) {
            Action::call(player, engine.betting().call_amount(seat))
        } else {
            Action::all_in(player, seat.stack())
        }
    }

    fn name(&self) -> &str {
        "CallingStation"
    }
}

/// Plays back a fixed list of actions, then folds.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    actions: Vec<Action>,
    next: usize,
}

impl Scripted {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, next: 0 }
    }
}

impl DecisionMaker for Scripted {
    fn decide(&mut self, _engine: &Engine, player: PlayerId) -> Action {
        match self.actions.get(self.next) {
            Some(&a) => {
                self.next += 1;
                a
            }
            None => Action::fold(player),
        }
    }

    fn name(&self) -> &str {
        "Scripted"
    }
}

/// Serialized submission loop for one table.
pub struct Driver {
    agents: BTreeMap<PlayerId, Box<dyn DecisionMaker>>,
    max_rejections: usize,
}

impl Driver {
    pub const DEFAULT_MAX_REJECTIONS: usize = 3;

    pub fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            max_rejections: Self::DEFAULT_MAX_REJECTIONS,
        }
    }

    /// Rejections tolerated per turn before the seat is folded for the
    /// agent.
    pub fn with_max_rejections(mut self, n: usize) -> Self {
        self.max_rejections = n;
        self
    }

    pub fn add_agent(&mut self, player: PlayerId, agent: Box<dyn DecisionMaker>) {
        self.agents.insert(player, agent);
    }

    /// Plays the running hand to completion.
    ///
    /// # Errors
    ///
    /// Fatal engine errors, `InvalidGameState` when no hand is running, and
    /// `InvalidPlayer` when the seat to act has no agent.
    pub fn run_hand(&mut self, engine: &mut Engine) -> Result<HandOutcome, GameError> {
        loop {
            let seat = engine
                .turn()
                .ok_or(GameError::InvalidGameState("no hand in progress"))?;
            let player = engine
                .seat(seat)
                .map(|s| s.id())
                .ok_or_else(|| GameError::CorruptState(format!("turn seat {} is empty", seat)))?;
            let agent = self.agents.get_mut(&player).ok_or(GameError::InvalidPlayer {
                player,
                reason: "no decision maker",
            })?;

            let mut rejections = 0;
            let result = loop {
                let action = agent.decide(engine, player);
                match engine.submit(action) {
                    Ok(done) => break done,
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        rejections += 1;
                        tracing::warn!(
                            seat,
                            player,
                            agent = agent.name(),
                            error = %e,
                            rejections,
                            "action rejected"
                        );
                        agent.rejected(&action, &e);
                        if rejections >= self.max_rejections {
                            tracing::warn!(seat, player, "too many rejections, folding");
                            break engine.submit(Action::fold(player))?;
                        }
                    }
                }
            };
            if let Some(outcome) = result {
                return Ok(outcome);
            }
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calling_stations_reach_showdown() {
        let mut engine = Engine::new(5, 10, Some(3));
        engine.sit(0, 1, 200).unwrap();
        engine.sit(1, 2, 200).unwrap();
        engine.sit(2, 3, 200).unwrap();
        engine.start_hand().unwrap();

        let mut driver = Driver::new();
        for id in 1..=3 {
            driver.add_agent(id, Box::new(CallingStation));
        }
        let outcome = driver.run_hand(&mut engine).unwrap();
        assert!(!outcome.ended_by_fold);
        assert_eq!(outcome.pot, 30);
        assert_eq!(outcome.board.len(), 5);
        assert_eq!(engine.total_chips(), 600);
    }

    #[test]
    fn calling_station_folds_for_an_unseated_player() {
        let engine = Engine::new(5, 10, Some(3));
        assert_eq!(CallingStation.decide(&engine, 42), Action::fold(42));
    }

    #[test]
    fn missing_agent_is_reported() {
        let mut engine = Engine::new(5, 10, Some(3));
        engine.sit(0, 1, 200).unwrap();
        engine.sit(1, 2, 200).unwrap();
        engine.start_hand().unwrap();
        let mut driver = Driver::new();
        driver.add_agent(2, Box::new(CallingStation));
        assert!(matches!(
            driver.run_hand(&mut engine),
            Err(GameError::InvalidPlayer { player: 1, .. })
        ));
    }
}
