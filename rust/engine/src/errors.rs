use crate::game::Phase;
use crate::player::Seat;
use crate::rules::IllegalMove;
use thiserror::Error;

/// Rejections from the game manager. None of them leaves a trace in the game
/// state: the operation is refused before anything is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Illegal(#[from] IllegalMove),
    #[error("Expected the {expected:?} phase, currently in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("It's not {actual}'s turn (expected {expected})")]
    NotYourTurn { expected: Seat, actual: Seat },
    #[error("A Coup Fourré response is pending")]
    InterruptPending,
    #[error("No Coup Fourré window is open")]
    NoPendingInterrupt,
    #[error("{0} is not the defender of the pending hazard")]
    NotTheDefender(Seat),
    #[error("No safety in hand answers the pending hazard")]
    NoMatchingSafety,
    #[error("{card} must be played on {expected}")]
    WrongTarget { card: String, expected: Seat },
    #[error("{0} is not in hand")]
    CardNotInHand(String),
    #[error("Round is over")]
    RoundOver,
    #[error("Round is still in progress")]
    RoundInProgress,
    #[error("Round scores were already tallied")]
    RoundAlreadyTallied,
    #[error("Match is over")]
    MatchOver,
}
