//! Baseline priority strategy.
//!
//! Plays the first legal card in a fixed priority order and otherwise throws
//! away the card it values least. Fully deterministic, so simulations with a
//! seeded deck are reproducible.

use crate::{Decision, Strategy, StrategyError};
use mille_engine::cards::{Card, CardKind, Remedy};
use mille_engine::game::GameManager;
use mille_engine::player::Seat;
use mille_engine::rules::logical_target;

/// Keep weight of a card: higher means more worth holding on to.
///
/// Safeties are never thrown away while anything else is in hand, Roll is the
/// card a stopped player needs most, distance is worth its kilometres and the
/// rest is replaceable.
pub fn card_weight(card: &Card) -> u32 {
    match card {
        Card::Safety(_) => 1000,
        Card::Remedy(Remedy::Roll) => 500,
        Card::Distance(_) => card.value(),
        _ => 50,
    }
}

/// The card with the lowest [`card_weight`]; the first one on ties.
pub fn lowest_weight(hand: &[Card]) -> Option<Card> {
    hand.iter().copied().min_by_key(card_weight)
}

/// Priority strategy for the automated seat.
///
/// 1. any legal Safety
/// 2. any legal Remedy or End Limit
/// 3. the highest legal Distance
/// 4. any legal Hazard or Speed Limit against the opponent
///
/// Failing all of those it discards the lowest-weighted card. It always
/// accepts a Coup Fourré.
///
/// # Example
///
/// ```rust
/// use mille_ai::baseline::BaselineAI;
/// use mille_ai::{Decision, Strategy};
/// use mille_engine::game::GameManager;
///
/// let ai = BaselineAI::new();
/// assert_eq!(ai.name(), "BaselineAI");
///
/// let mut game = GameManager::new(Some(42));
/// game.start_new_round().expect("round");
/// let seat = game.current_turn();
/// game.draw(seat).expect("draw");
///
/// match ai.decide(&game, seat).expect("decision") {
///     Decision::Play { card, target } => assert!(game.validate(&card, seat, target).is_ok()),
///     Decision::Discard(card) => assert!(game.player(seat).holds(&card)),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BaselineAI;

impl BaselineAI {
    pub fn new() -> Self {
        Self
    }

    fn first_legal(game: &GameManager, seat: Seat, kinds: &[CardKind]) -> Option<Card> {
        game.player(seat)
            .hand()
            .iter()
            .copied()
            .filter(|card| kinds.contains(&card.kind()))
            .find(|card| game.validate(card, seat, logical_target(card, seat)).is_ok())
    }

    fn best_distance(game: &GameManager, seat: Seat) -> Option<Card> {
        game.player(seat)
            .hand()
            .iter()
            .copied()
            .filter(|card| card.kind() == CardKind::Distance)
            .filter(|card| game.validate(card, seat, seat).is_ok())
            .max_by_key(|card| card.value())
    }

    /// The card this strategy would play, if any is legal.
    pub fn choose_play(game: &GameManager, seat: Seat) -> Option<Card> {
        Self::first_legal(game, seat, &[CardKind::Safety])
            .or_else(|| Self::first_legal(game, seat, &[CardKind::Remedy, CardKind::EndLimit]))
            .or_else(|| Self::best_distance(game, seat))
            .or_else(|| Self::first_legal(game, seat, &[CardKind::Hazard, CardKind::SpeedLimit]))
    }
}

impl Strategy for BaselineAI {
    fn decide(&self, game: &GameManager, seat: Seat) -> Result<Decision, StrategyError> {
        if let Some(card) = Self::choose_play(game, seat) {
            return Ok(Decision::Play {
                card,
                target: logical_target(&card, seat),
            });
        }
        lowest_weight(game.player(seat).hand())
            .map(Decision::Discard)
            .ok_or(StrategyError::EmptyHand(seat))
    }

    fn name(&self) -> &str {
        "BaselineAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mille_engine::cards::{Hazard, Safety};
    use mille_engine::deck::Deck;

    const ROLL: Card = Card::Remedy(Remedy::Roll);
    const STOP: Card = Card::Hazard(Hazard::Stop);
    const D25: Card = Card::Distance(25);

    /// Deals `player` and `ai` in alternation, then `rest`, with the player
    /// starting.
    fn table(player: [Card; 6], ai: [Card; 6], rest: &[Card]) -> GameManager {
        let mut cards = Vec::new();
        for i in 0..6 {
            cards.push(player[i]);
            cards.push(ai[i]);
        }
        cards.extend_from_slice(rest);
        let mut game = GameManager::new(Some(1));
        game.start_round_with(Deck::stacked(cards), Seat::Player)
            .expect("round");
        game
    }

    fn decide_after_draw(game: &mut GameManager, seat: Seat) -> Decision {
        game.draw(seat).expect("draw");
        BaselineAI::new().decide(game, seat).expect("decision")
    }

    #[test]
    fn test_baseline_ai_creation() {
        let ai = BaselineAI::new();
        assert_eq!(ai.name(), "BaselineAI");
        assert!(ai.accepts_coup_fourre(&GameManager::new(Some(1)), Seat::Ai));
    }

    #[test]
    fn test_card_weights() {
        assert_eq!(card_weight(&Card::Safety(Safety::ExtraTank)), 1000);
        assert_eq!(card_weight(&ROLL), 500);
        assert_eq!(card_weight(&Card::Distance(200)), 200);
        assert_eq!(card_weight(&Card::Distance(25)), 25);
        assert_eq!(card_weight(&STOP), 50);
        assert_eq!(card_weight(&Card::Remedy(Remedy::Gasoline)), 50);
        assert_eq!(card_weight(&Card::EndLimit), 50);
    }

    #[test]
    fn test_lowest_weight_prefers_the_first_on_ties() {
        let hand = [
            Card::Distance(100),
            STOP,
            Card::SpeedLimit,
            Card::Safety(Safety::DrivingAce),
        ];
        assert_eq!(lowest_weight(&hand), Some(STOP));
        assert_eq!(lowest_weight(&[]), None);
    }

    #[test]
    fn test_safety_beats_everything() {
        let mut game = table(
            [D25; 6],
            [ROLL, Card::Safety(Safety::ExtraTank), Card::Distance(100), STOP, ROLL, ROLL],
            &[D25; 4],
        );
        game.draw(Seat::Player).expect("draw");
        game.discard(D25, Seat::Player).expect("discard");
        assert_eq!(
            decide_after_draw(&mut game, Seat::Ai),
            Decision::Play {
                card: Card::Safety(Safety::ExtraTank),
                target: Seat::Ai
            }
        );
    }

    #[test]
    fn test_remedy_before_distance() {
        let mut game = table(
            [D25; 6],
            [Card::Distance(100), ROLL, Card::Distance(75), STOP, STOP, STOP],
            &[D25; 4],
        );
        game.draw(Seat::Player).expect("draw");
        game.discard(D25, Seat::Player).expect("discard");
        assert_eq!(
            decide_after_draw(&mut game, Seat::Ai),
            Decision::Play {
                card: ROLL,
                target: Seat::Ai
            }
        );
    }

    #[test]
    fn test_highest_distance_wins() {
        let mut game = table(
            [ROLL, D25, D25, D25, D25, D25],
            [ROLL, Card::Distance(50), Card::Distance(100), STOP, Card::Distance(75), Card::Distance(200)],
            &[D25; 10],
        );
        game.draw(Seat::Player).expect("draw");
        game.submit_move(ROLL, Seat::Player, Seat::Player).expect("roll");
        game.draw(Seat::Ai).expect("draw");
        game.submit_move(ROLL, Seat::Ai, Seat::Ai).expect("roll");
        game.draw(Seat::Player).expect("draw");
        game.discard(D25, Seat::Player).expect("discard");

        assert_eq!(
            decide_after_draw(&mut game, Seat::Ai),
            Decision::Play {
                card: Card::Distance(200),
                target: Seat::Ai
            }
        );
    }

    #[test]
    fn test_attacks_target_the_opponent() {
        let mut game = table(
            [ROLL, D25, D25, D25, D25, D25],
            [STOP, Card::SpeedLimit, STOP, STOP, STOP, STOP],
            &[D25; 10],
        );
        game.draw(Seat::Player).expect("draw");
        game.submit_move(ROLL, Seat::Player, Seat::Player).expect("roll");
        // The AI is not rolling, so nothing of its own is playable
        assert_eq!(
            decide_after_draw(&mut game, Seat::Ai),
            Decision::Play {
                card: STOP,
                target: Seat::Player
            }
        );
    }

    #[test]
    fn test_discards_lowest_weight_when_stuck() {
        let mut game = table(
            [D25; 6],
            [
                Card::Distance(100),
                Card::Distance(50),
                STOP,
                Card::Distance(75),
                Card::Remedy(Remedy::Gasoline),
                Card::Distance(200),
            ],
            &[D25; 4],
        );
        game.draw(Seat::Player).expect("draw");
        game.discard(D25, Seat::Player).expect("discard");
        // Not rolling, nothing to fix, and the player cannot be stopped twice
        assert_eq!(
            decide_after_draw(&mut game, Seat::Ai),
            Decision::Discard(D25)
        );
    }
}
