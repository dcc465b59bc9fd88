use crate::cards::{Card, Hazard, Remedy};
use crate::player::{PlayerState, Seat, MAX_TWO_HUNDREDS, TRIP_LENGTH};
use thiserror::Error;

/// Why a move was refused. The `Display` text is meant for the player.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("You must play a Roll card first")]
    NotRolling,
    #[error("Speed limit: cannot play more than 50 km")]
    OverSpeedLimit,
    #[error("Cannot go past {limit} km (at {current}, card is {value})")]
    Overshoot { current: u32, value: u32, limit: u32 },
    #[error("Only two 200 km cards may be played per round")]
    TooManyTwoHundreds,
    #[error("Opponent is immune to {0}")]
    TargetImmune(String),
    #[error("Opponent is already stopped or has not started rolling")]
    TargetNotRolling,
    #[error("Opponent has Right of Way")]
    TargetHasRightOfWay,
    #[error("Opponent is already speed limited")]
    AlreadySpeedLimited,
    #[error("Not speed limited")]
    NotSpeedLimited,
    #[error("Already moving")]
    AlreadyMoving,
    #[error("Roll cannot be played on {0}")]
    InvalidRoll(String),
    #[error("Nothing to fix")]
    NothingToFix,
    #[error("{remedy} does not fix {top}")]
    WrongRemedy { remedy: String, top: String },
}

/// Decides whether `actor` may play `card` against `target`.
///
/// `target` is the opponent for hazards and speed limits and the actor itself
/// for everything else. The check reads both states and mutates nothing, so
/// calling it twice on unchanged state gives the same answer.
///
/// # Examples
///
/// ```
/// use mille_engine::cards::{Card, Remedy};
/// use mille_engine::player::PlayerState;
/// use mille_engine::rules::{validate_move, IllegalMove};
///
/// let me = PlayerState::new("me");
/// // Nobody rolls before a Roll card is down
/// assert_eq!(validate_move(&Card::Distance(25), &me, &me), Err(IllegalMove::NotRolling));
/// assert!(validate_move(&Card::Remedy(Remedy::Roll), &me, &me).is_ok());
/// ```
pub fn validate_move(
    card: &Card,
    actor: &PlayerState,
    target: &PlayerState,
) -> Result<(), IllegalMove> {
    match card {
        Card::Distance(_) => validate_distance(card.value(), actor),
        Card::Hazard(_) => {
            if target.is_immune_to(card) {
                return Err(IllegalMove::TargetImmune(card.name()));
            }
            if !target.can_move() {
                return Err(IllegalMove::TargetNotRolling);
            }
            Ok(())
        }
        Card::SpeedLimit => {
            if target.has_right_of_way() {
                return Err(IllegalMove::TargetHasRightOfWay);
            }
            if target.is_speed_limited() {
                return Err(IllegalMove::AlreadySpeedLimited);
            }
            Ok(())
        }
        Card::EndLimit => match actor.speed_pile().top() {
            Some(Card::SpeedLimit) => Ok(()),
            _ => Err(IllegalMove::NotSpeedLimited),
        },
        Card::Remedy(Remedy::Roll) => validate_roll(actor),
        Card::Remedy(remedy) => {
            let top = actor.battle_pile().top().ok_or(IllegalMove::NothingToFix)?;
            if card.fixes(top) {
                Ok(())
            } else {
                Err(IllegalMove::WrongRemedy {
                    remedy: remedy.name().to_string(),
                    top: top.name(),
                })
            }
        }
        Card::Safety(_) => Ok(()),
    }
}

/// Hazards and speed limits go on the opponent; every other card is played on
/// the actor's own tableau.
pub fn logical_target(card: &Card, actor: Seat) -> Seat {
    if card.is_attack() {
        actor.opponent()
    } else {
        actor
    }
}

fn validate_distance(value: u32, actor: &PlayerState) -> Result<(), IllegalMove> {
    if !actor.can_move() {
        return Err(IllegalMove::NotRolling);
    }
    if actor.is_speed_limited() && value > 50 {
        return Err(IllegalMove::OverSpeedLimit);
    }
    let current = actor.total_distance();
    if current + value > TRIP_LENGTH {
        return Err(IllegalMove::Overshoot {
            current,
            value,
            limit: TRIP_LENGTH,
        });
    }
    if value == 200 && actor.two_hundreds_played() >= MAX_TWO_HUNDREDS {
        return Err(IllegalMove::TooManyTwoHundreds);
    }
    Ok(())
}

fn validate_roll(actor: &PlayerState) -> Result<(), IllegalMove> {
    if actor.can_move() {
        return Err(IllegalMove::AlreadyMoving);
    }
    match actor.battle_pile().top() {
        None | Some(Card::Hazard(Hazard::Stop)) | Some(Card::Remedy(_)) => Ok(()),
        Some(other) => Err(IllegalMove::InvalidRoll(other.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Safety;

    fn rolling(name: &str) -> PlayerState {
        let mut p = PlayerState::new(name);
        p.battle_pile_mut().push(Card::Remedy(Remedy::Roll));
        p
    }

    #[test]
    fn reasons_are_readable() {
        let me = PlayerState::new("me");
        let err = validate_move(&Card::Distance(100), &me, &me).unwrap_err();
        assert_eq!(err.to_string(), "You must play a Roll card first");

        let mut me = rolling("me");
        me.add_distance(Card::Distance(100));
        let err = validate_move(&Card::Remedy(Remedy::Gasoline), &me, &me).unwrap_err();
        assert_eq!(err.to_string(), "Gasoline does not fix Roll");
    }

    #[test]
    fn roll_is_refused_on_top_of_an_unfixed_hazard() {
        let mut me = PlayerState::new("me");
        me.battle_pile_mut().push(Card::Hazard(Hazard::FlatTire));
        assert_eq!(
            validate_move(&Card::Remedy(Remedy::Roll), &me, &me),
            Err(IllegalMove::InvalidRoll("Flat Tire".into()))
        );
    }

    #[test]
    fn roll_confirms_movement_after_a_remedy() {
        let mut me = PlayerState::new("me");
        me.battle_pile_mut().push(Card::Hazard(Hazard::Accident));
        me.battle_pile_mut().push(Card::Remedy(Remedy::Repairs));
        assert!(!me.can_move());
        assert!(validate_move(&Card::Remedy(Remedy::Roll), &me, &me).is_ok());
    }

    #[test]
    fn right_of_way_blocks_speed_limit_even_when_unlimited() {
        let me = rolling("me");
        let mut them = rolling("them");
        them.add_safety(Safety::RightOfWay);
        assert_eq!(
            validate_move(&Card::SpeedLimit, &me, &them),
            Err(IllegalMove::TargetHasRightOfWay)
        );
    }
}
