use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// Draw pile for one round. Cards are taken from the front.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            position: 0,
            rng,
        }
    }

    /// A deck that deals exactly `cards`, in order. Shuffling it rebuilds the
    /// standard deck.
    pub fn stacked(cards: Vec<Card>) -> Self {
        Self {
            cards,
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(0),
        }
    }

    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.position).copied()?;
        self.position += 1;
        Some(card)
    }

    pub fn peek(&self) -> Option<&Card> {
        self.cards.get(self.position)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Hazard, Remedy};

    #[test]
    fn stacked_deck_deals_in_order_then_runs_dry() {
        let mut deck = Deck::stacked(vec![
            Card::Remedy(Remedy::Roll),
            Card::Hazard(Hazard::Stop),
        ]);
        assert_eq!(deck.remaining(), 2);
        assert_eq!(deck.peek(), Some(&Card::Remedy(Remedy::Roll)));
        assert_eq!(deck.draw(), Some(Card::Remedy(Remedy::Roll)));
        assert_eq!(deck.draw(), Some(Card::Hazard(Hazard::Stop)));
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), None);
    }
}
