use serde::{Deserialize, Serialize};

use crate::player::{PlayerState, TRIP_LENGTH};

pub const POINTS_PER_SAFETY: u32 = 100;
pub const POINTS_PER_COUP_FOURRE: u32 = 300;
pub const ALL_SAFETIES_BONUS: u32 = 300;
pub const TRIP_COMPLETE_BONUS: u32 = 400;
pub const DELAYED_ACTION_BONUS: u32 = 300;
pub const SAFE_TRIP_BONUS: u32 = 300;
pub const SHUTOUT_BONUS: u32 = 500;

/// Round score split into its terms. Every bonus is independent of the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub distance: u32,
    pub safeties: u32,
    pub coup_fourres: u32,
    pub all_safeties: u32,
    pub trip_complete: u32,
    /// Trip finished after the draw pile ran out
    pub delayed_action: u32,
    /// Trip finished without any 200 km card
    pub safe_trip: u32,
    /// Trip finished while the opponent never moved
    pub shutout: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.distance
            + self.safeties
            + self.coup_fourres
            + self.all_safeties
            + self.trip_complete
            + self.delayed_action
            + self.safe_trip
            + self.shutout
    }
}

/// Scores `player` from the final state of a round.
///
/// # Examples
///
/// ```
/// use mille_engine::cards::{Card, Safety};
/// use mille_engine::player::PlayerState;
/// use mille_engine::scoring::score_round;
///
/// let mut me = PlayerState::new("me");
/// for _ in 0..10 {
///     me.add_distance(Card::Distance(100));
/// }
/// me.add_safety(Safety::ExtraTank);
/// let opponent = PlayerState::new("them");
///
/// // 1000 + 100 (safety) + 400 (trip) + 300 (no 200s) + 500 (shutout)
/// assert_eq!(score_round(&me, &opponent, false).total(), 2300);
/// ```
pub fn score_round(player: &PlayerState, opponent: &PlayerState, deck_empty: bool) -> ScoreBreakdown {
    let distance = player.total_distance();
    let safety_count = player.safety_area().len() as u32;
    let mut score = ScoreBreakdown {
        distance,
        safeties: safety_count * POINTS_PER_SAFETY,
        coup_fourres: player.coup_fourre_count() * POINTS_PER_COUP_FOURRE,
        ..ScoreBreakdown::default()
    };

    if safety_count == 4 {
        score.all_safeties = ALL_SAFETIES_BONUS;
    }

    if distance == TRIP_LENGTH {
        score.trip_complete = TRIP_COMPLETE_BONUS;
        if deck_empty {
            score.delayed_action = DELAYED_ACTION_BONUS;
        }
        if player.two_hundreds_played() == 0 {
            score.safe_trip = SAFE_TRIP_BONUS;
        }
        if opponent.total_distance() == 0 {
            score.shutout = SHUTOUT_BONUS;
        }
    }

    score
}
