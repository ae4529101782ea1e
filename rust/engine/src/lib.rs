//! # holdem-engine: Texas Hold'em Rule Engine
//!
//! Rule engine for one hand of multiplayer no-limit Texas Hold'em at a table
//! of up to ten seats. It sequences the betting rounds, validates and
//! applies every action, moves chips and settles the pot by ranking hands.
//! It never decides what a player should do.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Seeded deck shuffling with ChaCha20 RNG, stacked decks for replay
//! - [`hand`] - Best-five-of-seven hand evaluation and comparison
//! - [`rules`] - Action validation, legal actions and raise bounds
//! - [`player`] - Seats, player ids and actions
//! - [`game`] - Phases and the fixed-capacity seat arena
//! - [`engine`] - The hand state machine and pot distribution
//! - [`agent`] - Decision-maker trait and the driver loop
//! - [`logger`] - Hand events, sinks and JSONL hand records
//! - [`config`] - Table configuration from TOML and environment
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use holdem_engine::cards::Card;
//! use holdem_engine::hand::{evaluate_hand, Category};
//!
//! let cards: Vec<Card> = ["Ah", "Kh", "Qh", "Jh", "Th", "2c", "3d"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//!
//! let best = evaluate_hand(&cards);
//! assert_eq!(best.category, Category::RoyalFlush);
//! ```
//!
//! ## Playing a Hand
//!
//! Every action goes through [`engine::Engine::submit`]. Rejected actions
//! return an error and leave the table unchanged:
//!
//! ```rust
//! use holdem_engine::engine::Engine;
//! use holdem_engine::errors::GameError;
//! use holdem_engine::player::Action;
//!
//! let mut engine = Engine::new(5, 10, Some(42));
//! engine.sit(0, 1, 1000).unwrap();
//! engine.sit(1, 2, 1000).unwrap();
//! engine.start_hand().unwrap();
//!
//! // player 2 is in the big blind and does not hold the turn
//! assert!(matches!(
//!     engine.submit(Action::check(2)),
//!     Err(GameError::OutOfTurn { .. })
//! ));
//!
//! let outcome = engine.submit(Action::fold(1)).unwrap().unwrap();
//! assert_eq!(outcome.winners, vec![1]);
//! assert_eq!(engine.seat(1).unwrap().stack(), 1005);
//! ```
//!
//! ## Deterministic Gameplay
//!
//! All deals are reproducible from a seed:
//!
//! ```rust
//! use holdem_engine::deck::Deck;
//!
//! let mut a = Deck::new_with_seed(42);
//! let mut b = Deck::new_with_seed(42);
//! a.shuffle();
//! b.shuffle();
//! assert_eq!(a.deal_card(), b.deal_card());
//! ```

pub mod agent;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod rules;
