#![allow(dead_code)]

use mille_engine::cards::Card;
use mille_engine::deck::Deck;
use mille_engine::game::{GameManager, Phase};
use mille_engine::player::Seat;

/// A deck that deals `player` and `ai` as opening hands (alternating, player
/// first) and then yields `rest` in order.
pub fn deal(player: [Card; 6], ai: [Card; 6], rest: &[Card]) -> Deck {
    let mut cards = Vec::with_capacity(12 + rest.len());
    for i in 0..6 {
        cards.push(player[i]);
        cards.push(ai[i]);
    }
    cards.extend_from_slice(rest);
    Deck::stacked(cards)
}

pub fn game_with(deck: Deck, starter: Seat) -> GameManager {
    let mut game = GameManager::new(Some(1));
    game.start_round_with(deck, starter).expect("round starts");
    game
}

/// Draws (when in the draw phase) and then plays `card` with its natural target.
pub fn draw_and_play(game: &mut GameManager, seat: Seat, card: Card) {
    if game.phase() == Phase::Draw {
        game.draw(seat).expect("draw");
    }
    let target = mille_engine::rules::logical_target(&card, seat);
    game.submit_move(card, seat, target)
        .unwrap_or_else(|e| panic!("{seat} playing {card}: {e}"));
}

/// Draws (when in the draw phase) and throws away the first card in hand.
pub fn draw_and_discard(game: &mut GameManager, seat: Seat) {
    if game.phase() == Phase::Draw {
        game.draw(seat).expect("draw");
    }
    let card = game.player(seat).hand()[0];
    game.discard(card, seat).expect("discard");
}

pub fn filler(n: usize) -> Vec<Card> {
    vec![Card::Distance(25); n]
}
