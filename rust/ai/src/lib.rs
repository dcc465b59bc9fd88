//! # mille-ai: Automated Opponents for the Road Race
//!
//! Decision-making for the automated seat. A strategy only reads the
//! [`GameManager`]; its choice is applied through the same public operations a
//! human caller uses, so the AI has no privileged mutation path.
//!
//! ## Core Components
//!
//! - [`Strategy`] - Trait defining the decision interface
//! - [`baseline`] - Priority-ordered strategy (safety, remedy, distance, attack)
//! - [`random`] - Uniformly random legal play, for benchmarking
//! - [`create_ai`] - Factory function for creating strategies by name
//! - [`play_turn`] / [`play_round`] - Headless drivers
//!
//! ## Quick Start
//!
//! ```rust
//! use mille_ai::{create_ai, play_turn};
//! use mille_engine::game::GameManager;
//!
//! let ai = create_ai("baseline").expect("known strategy");
//!
//! let mut game = GameManager::new(Some(42));
//! game.start_new_round().expect("round starts");
//!
//! let seat = game.current_turn();
//! let action = play_turn(&mut game, seat, ai.as_ref()).expect("turn");
//! println!("{} chose {:?}", ai.name(), action);
//! ```
//!
//! ## AI Types
//!
//! - `"baseline"` - Priority strategy described in [`baseline::BaselineAI`]
//! - `"random"` - [`random::RandomAI`]

use mille_engine::cards::Card;
use mille_engine::errors::GameError;
use mille_engine::game::{GameManager, Interrupt, MoveOutcome, Phase};
use mille_engine::player::Seat;
use thiserror::Error;

pub mod baseline;
pub mod random;

/// Names accepted by [`create_ai`].
pub const AVAILABLE_STRATEGIES: [&str; 2] = ["baseline", "random"];

/// What a strategy wants to do with the Play phase of its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Play { card: Card, target: Seat },
    Discard(Card),
}

impl Decision {
    pub fn card(&self) -> Card {
        match self {
            Decision::Play { card, .. } | Decision::Discard(card) => *card,
        }
    }

    /// Carries the decision out through the public game operations.
    pub fn apply(self, game: &mut GameManager, seat: Seat) -> Result<TurnAction, GameError> {
        match self {
            Decision::Play { card, target } => {
                let outcome = game.submit_move(card, seat, target)?;
                Ok(TurnAction::Played { card, outcome })
            }
            Decision::Discard(card) => {
                game.discard(card, seat)?;
                Ok(TurnAction::Discarded(card))
            }
        }
    }
}

/// What [`play_turn`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    Played { card: Card, outcome: MoveOutcome },
    Discarded(Card),
    /// Answered a pending hazard out of turn with this safety
    CoupFourre(Card),
    /// Let a pending hazard through
    LetThrough,
}

/// Failures inside the automated opponent. None of them touches game state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StrategyError {
    #[error("Unknown AI type: {0}")]
    UnknownStrategy(String),
    #[error("{0} has no card to play or discard")]
    EmptyHand(Seat),
    #[error("It is not {0}'s move")]
    NotOnMove(Seat),
    #[error("Strategy failed: {0}")]
    Internal(String),
    #[error("Move was rejected: {0}")]
    Rejected(#[from] GameError),
}

/// Interface for automated opponents.
///
/// # Example Implementation
///
/// ```rust
/// use mille_ai::{Decision, Strategy, StrategyError};
/// use mille_engine::game::GameManager;
/// use mille_engine::player::Seat;
///
/// /// Never plays, always throws away the first card.
/// struct Hoarder;
///
/// impl Strategy for Hoarder {
///     fn decide(&self, game: &GameManager, seat: Seat) -> Result<Decision, StrategyError> {
///         let card = game
///             .player(seat)
///             .hand()
///             .first()
///             .copied()
///             .ok_or(StrategyError::EmptyHand(seat))?;
///         Ok(Decision::Discard(card))
///     }
///
///     fn name(&self) -> &str {
///         "Hoarder"
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Chooses a play or a discard for `seat`, which is in its Play phase.
    fn decide(&self, game: &GameManager, seat: Seat) -> Result<Decision, StrategyError>;

    /// Whether to answer a hazard aimed at `seat` with a Coup Fourré.
    fn accepts_coup_fourre(&self, _game: &GameManager, _seat: Seat) -> bool {
        true
    }

    fn name(&self) -> &str;
}

/// Factory function to create strategies by name.
///
/// ```rust
/// use mille_ai::{create_ai, StrategyError};
///
/// let ai = create_ai("baseline").unwrap();
/// assert_eq!(ai.name(), "BaselineAI");
/// assert!(matches!(create_ai("oracle"), Err(StrategyError::UnknownStrategy(_))));
/// ```
pub fn create_ai(name: &str) -> Result<Box<dyn Strategy>, StrategyError> {
    match name {
        "baseline" => Ok(Box::new(baseline::BaselineAI::new())),
        "random" => Ok(Box::new(random::RandomAI::new())),
        other => Err(StrategyError::UnknownStrategy(other.to_string())),
    }
}

/// Like [`create_ai`], with a fixed seed for strategies that use randomness.
pub fn create_ai_with_seed(name: &str, seed: u64) -> Result<Box<dyn Strategy>, StrategyError> {
    match name {
        "random" => Ok(Box::new(random::RandomAI::with_seed(seed))),
        other => create_ai(other),
    }
}

/// The seat expected to act next: the defender while a Coup Fourré window is
/// open, otherwise the seat whose turn it is. `None` once the round is over.
pub fn seat_to_act(game: &GameManager) -> Option<Seat> {
    if game.is_round_over() || game.is_match_over() {
        return None;
    }
    match game.interrupt() {
        Interrupt::AwaitingCoupFourre { target, .. } => Some(target),
        Interrupt::Idle => Some(game.current_turn()),
    }
}

/// Runs one complete step for `seat`: answers a pending Coup Fourré window,
/// or draws (when in the Draw phase), decides and applies the decision.
pub fn play_turn(
    game: &mut GameManager,
    seat: Seat,
    strategy: &dyn Strategy,
) -> Result<TurnAction, StrategyError> {
    if seat_to_act(game) != Some(seat) {
        return Err(StrategyError::NotOnMove(seat));
    }

    if game.is_awaiting_coup_fourre() {
        if strategy.accepts_coup_fourre(game, seat) {
            let safety = game.resolve_coup_fourre(seat)?;
            return Ok(TurnAction::CoupFourre(safety));
        }
        game.decline_coup_fourre(seat)?;
        return Ok(TurnAction::LetThrough);
    }

    if game.phase() == Phase::Draw {
        game.draw(seat)?;
        // A draw can end the round or pass a stranded turn along
        if seat_to_act(game) != Some(seat) {
            return Err(StrategyError::NotOnMove(seat));
        }
    }

    let decision = strategy.decide(game, seat)?;
    Ok(decision.apply(game, seat)?)
}

/// Plays the current round to its end with `player` and `ai` deciding for
/// their seats. Returns the number of steps taken.
pub fn play_round(
    game: &mut GameManager,
    player: &dyn Strategy,
    ai: &dyn Strategy,
) -> Result<usize, StrategyError> {
    let mut steps = 0;
    while let Some(seat) = seat_to_act(game) {
        let strategy = match seat {
            Seat::Player => player,
            Seat::Ai => ai,
        };
        play_turn(game, seat, strategy)?;
        steps += 1;
    }
    Ok(steps)
}
