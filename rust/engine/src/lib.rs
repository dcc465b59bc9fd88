//! # mille-engine: Road Race Rules Engine
//!
//! Rules and turn management for a two-seat game of the "mille" road race
//! family: each side races to exactly 1000 km while attacking the other with
//! hazards, curing itself with remedies and shielding itself with safeties.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card values, the remedy/safety lookup tables and the standard deck
//! - [`deck`] - Seeded shuffling and drawing from the front
//! - [`player`] - Seats, status piles and per-player derived predicates
//! - [`rules`] - The rule book: pure move validation
//! - [`game`] - The game manager: turns, phases, Coup Fourré window, round and match lifecycle
//! - [`scoring`] - Round scoring
//! - [`logger`] - Bounded, human-readable event log
//! - [`observer`] - State-change notification
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use mille_engine::cards::{Card, Remedy};
//! use mille_engine::game::GameManager;
//! use mille_engine::player::Seat;
//!
//! let mut game = GameManager::new(Some(42));
//! game.start_new_round().expect("round starts");
//!
//! let seat = game.current_turn();
//! game.draw(seat).expect("draw");
//!
//! // Legal moves can be listed straight from the rule book
//! let playable: Vec<Card> = game
//!     .player(seat)
//!     .hand()
//!     .iter()
//!     .copied()
//!     .filter(|c| game.validate(c, seat, mille_engine::rules::logical_target(c, seat)).is_ok())
//!     .collect();
//! if playable.contains(&Card::Remedy(Remedy::Roll)) {
//!     game.submit_move(Card::Remedy(Remedy::Roll), seat, seat).expect("roll");
//!     assert_eq!(game.current_turn(), seat.opponent());
//! }
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Shuffles and the first-round starter come from a seeded ChaCha RNG:
//!
//! ```rust
//! use mille_engine::game::GameManager;
//! use mille_engine::player::Seat;
//!
//! let mut a = GameManager::new(Some(9));
//! let mut b = GameManager::new(Some(9));
//! a.start_new_round().unwrap();
//! b.start_new_round().unwrap();
//! assert_eq!(a.player(Seat::Ai).hand(), b.player(Seat::Ai).hand());
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod logger;
pub mod observer;
pub mod player;
pub mod rules;
pub mod scoring;
