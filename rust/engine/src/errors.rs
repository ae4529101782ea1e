use thiserror::Error;

use crate::player::PlayerId;

/// Every way the engine can refuse a request. A rejected request never
/// mutates table state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Player {player} cannot act: {reason}")]
    InvalidPlayer { player: PlayerId, reason: &'static str },
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    OutOfTurn { expected: usize, actual: usize },
    #[error("Invalid game state: {0}")]
    InvalidGameState(&'static str),
    #[error("Invalid amount: {amount}, expected: {expected}")]
    InvalidAmount { amount: u32, expected: String },
    #[error("Insufficient chips: need {needed}, have {available}")]
    InsufficientChips { needed: u32, available: u32 },
    #[error("Action not allowed: {0}")]
    ActionNotAllowed(&'static str),

    #[error("Seat {0} does not exist")]
    SeatOutOfRange(usize),
    #[error("Seat {0} is already taken")]
    SeatTaken(usize),
    #[error("Player {0} is already seated")]
    PlayerAlreadySeated(PlayerId),
    #[error("Need at least two funded seats, found {0}")]
    NotEnoughPlayers(usize),

    #[error("Deck exhausted")]
    DeckExhausted,
    #[error("Corrupt table state: {0}")]
    CorruptState(String),
}

impl GameError {
    /// Fatal errors mean the table was corrupted outside validation and the
    /// request must not be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::DeckExhausted | GameError::CorruptState(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
