//! Random strategy, used as a sparring partner in simulations.

use std::sync::Mutex;

use crate::{Decision, Strategy, StrategyError};
use mille_engine::game::GameManager;
use mille_engine::player::Seat;
use mille_engine::rules::logical_target;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Plays a uniformly random legal card, or discards a random card when
/// nothing is legal. Coup Fourré windows are answered at random too.
#[derive(Debug)]
pub struct RandomAI {
    rng: Mutex<StdRng>,
}

impl RandomAI {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn pick(&self, len: usize) -> Result<usize, StrategyError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| StrategyError::Internal("random source poisoned".into()))?;
        Ok(rng.random_range(0..len))
    }
}

impl Default for RandomAI {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomAI {
    fn decide(&self, game: &GameManager, seat: Seat) -> Result<Decision, StrategyError> {
        let hand = game.player(seat).hand();
        if hand.is_empty() {
            return Err(StrategyError::EmptyHand(seat));
        }

        let legal: Vec<_> = hand
            .iter()
            .copied()
            .filter(|card| game.validate(card, seat, logical_target(card, seat)).is_ok())
            .collect();
        if legal.is_empty() {
            let card = hand[self.pick(hand.len())?];
            return Ok(Decision::Discard(card));
        }

        let card = legal[self.pick(legal.len())?];
        Ok(Decision::Play {
            card,
            target: logical_target(&card, seat),
        })
    }

    fn accepts_coup_fourre(&self, _game: &GameManager, _seat: Seat) -> bool {
        self.pick(2).map(|n| n == 0).unwrap_or(true)
    }

    fn name(&self) -> &str {
        "RandomAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_decisions_are_always_applicable() {
        let ai = RandomAI::with_seed(17);
        for seed in 0..20 {
            let mut game = GameManager::new(Some(seed));
            game.start_new_round().expect("round");
            let seat = game.current_turn();
            game.draw(seat).expect("draw");
            let decision = ai.decide(&game, seat).expect("decision");
            assert!(game.player(seat).holds(&decision.card()));
            decision.apply(&mut game, seat).expect("accepted");
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let mut game = GameManager::new(Some(3));
        game.start_new_round().expect("round");
        let seat = game.current_turn();
        game.draw(seat).expect("draw");

        let a = RandomAI::with_seed(5);
        let b = RandomAI::with_seed(5);
        for _ in 0..10 {
            assert_eq!(a.decide(&game, seat), b.decide(&game, seat));
        }
    }
}
