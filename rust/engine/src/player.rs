use crate::cards::{Card, CardKind, Remedy, Safety};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two seats at the table: the human player or the automated opponent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// Human seat
    Player,
    /// Automated opponent
    Ai,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::Player, Seat::Ai];

    pub fn opponent(self) -> Seat {
        match self {
            Seat::Player => Seat::Ai,
            Seat::Ai => Seat::Player,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Seat::Player => 0,
            Seat::Ai => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Player => f.write_str("player"),
            Seat::Ai => f.write_str("ai"),
        }
    }
}

/// A last-in status stack. Only the top card carries meaning, so nothing below
/// it is reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPile {
    cards: Vec<Card>,
}

impl StatusPile {
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn pop_top(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    fn clear(&mut self) {
        self.cards.clear();
    }
}

/// Distance needed to finish a trip.
pub const TRIP_LENGTH: u32 = 1000;

/// Maximum number of 200 km cards a player may lay down in one round.
pub const MAX_TWO_HUNDREDS: usize = 2;

/// Everything one player owns during a round, plus the running match score.
#[derive(Debug, Clone)]
pub struct PlayerState {
    name: String,
    hand: Vec<Card>,
    battle: StatusPile,
    speed: StatusPile,
    safety_area: Vec<Safety>,
    distance: Vec<Card>,
    coup_fourre_count: u32,
    match_score: u32,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            battle: StatusPile::default(),
            speed: StatusPile::default(),
            safety_area: Vec::new(),
            distance: Vec::new(),
            coup_fourre_count: 0,
            match_score: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn holds(&self, card: &Card) -> bool {
        self.hand.contains(card)
    }

    pub fn battle_pile(&self) -> &StatusPile {
        &self.battle
    }

    pub fn speed_pile(&self) -> &StatusPile {
        &self.speed
    }

    pub fn battle_pile_mut(&mut self) -> &mut StatusPile {
        &mut self.battle
    }

    pub fn speed_pile_mut(&mut self) -> &mut StatusPile {
        &mut self.speed
    }

    pub fn safety_area(&self) -> &[Safety] {
        &self.safety_area
    }

    pub fn distance_cards(&self) -> &[Card] {
        &self.distance
    }

    pub fn coup_fourre_count(&self) -> u32 {
        self.coup_fourre_count
    }

    pub fn match_score(&self) -> u32 {
        self.match_score
    }

    pub fn add_to_hand(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Removes one copy of `card` from the hand. Returns false if none was held.
    pub fn remove_from_hand(&mut self, card: &Card) -> bool {
        match self.hand.iter().position(|c| c == card) {
            Some(idx) => {
                self.hand.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    /// Places a safety in the safety area. Duplicates are ignored.
    pub fn add_safety(&mut self, safety: Safety) -> bool {
        if self.safety_area.contains(&safety) {
            return false;
        }
        self.safety_area.push(safety);
        true
    }

    /// Adds a distance card to the travelled total. Non-distance cards are refused.
    pub fn add_distance(&mut self, card: Card) -> bool {
        if card.kind() != CardKind::Distance {
            return false;
        }
        self.distance.push(card);
        true
    }

    pub(crate) fn record_coup_fourre(&mut self) {
        self.coup_fourre_count += 1;
    }

    pub(crate) fn add_match_points(&mut self, points: u32) {
        self.match_score = self.match_score.saturating_add(points);
    }

    pub(crate) fn clear_match_score(&mut self) {
        self.match_score = 0;
    }

    pub fn total_distance(&self) -> u32 {
        self.distance.iter().map(Card::value).sum()
    }

    pub fn two_hundreds_played(&self) -> usize {
        self.distance
            .iter()
            .filter(|c| **c == Card::Distance(200))
            .count()
    }

    pub fn has_safety(&self, safety: Safety) -> bool {
        self.safety_area.contains(&safety)
    }

    pub fn has_right_of_way(&self) -> bool {
        self.has_safety(Safety::RightOfWay)
    }
    pub fn has_extra_tank(&self) -> bool {
        self.has_safety(Safety::ExtraTank)
    }
    pub fn has_puncture_proof(&self) -> bool {
        self.has_safety(Safety::PunctureProof)
    }
    pub fn has_driving_ace(&self) -> bool {
        self.has_safety(Safety::DrivingAce)
    }

    /// Any safety in the safety area shields against this attack card.
    pub fn is_immune_to(&self, attack: &Card) -> bool {
        match attack.threat() {
            Some(threat) => self.safety_area.iter().any(|s| s.protects_against(threat)),
            None => false,
        }
    }

    /// First safety in hand that could answer this attack with a Coup Fourré.
    pub fn counter_in_hand(&self, attack: &Card) -> Option<Card> {
        self.hand
            .iter()
            .find(|c| c.protects_against(attack))
            .copied()
    }

    pub fn is_speed_limited(&self) -> bool {
        matches!(self.speed.top(), Some(Card::SpeedLimit)) && !self.has_right_of_way()
    }

    pub fn can_move(&self) -> bool {
        // Right of Way acts as a permanent Roll
        if self.has_right_of_way() {
            return !matches!(self.battle.top(), Some(Card::Hazard(_)));
        }
        matches!(self.battle.top(), Some(Card::Remedy(Remedy::Roll)))
    }

    /// Empties every pile and the hand for a new round. The match score survives.
    pub fn reset(&mut self) {
        self.hand.clear();
        self.battle.clear();
        self.speed.clear();
        self.safety_area.clear();
        self.distance.clear();
        self.coup_fourre_count = 0;
    }
}
