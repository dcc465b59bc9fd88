use serde::{Deserialize, Serialize};
use std::fmt;

/// The six card categories of the road race deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// Kilometres travelled
    Distance,
    /// Attack that stops the opponent
    Hazard,
    /// Cure for one hazard on the player's own battle pile
    Remedy,
    /// Permanent immunity
    Safety,
    /// Attack that caps the opponent at 50 km per play
    SpeedLimit,
    /// Lifts a speed limit
    EndLimit,
}

/// Hazards played onto an opponent's battle pile.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Hazard {
    Stop,
    OutOfGas,
    FlatTire,
    Accident,
}

/// Remedies played onto the player's own battle pile.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Remedy {
    Roll,
    Gasoline,
    SpareTire,
    Repairs,
}

/// The four safeties. A player holds at most one of each.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Safety {
    RightOfWay,
    ExtraTank,
    PunctureProof,
    DrivingAce,
}

/// Anything a safety can shield against: the four hazards plus the speed limit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Threat {
    Hazard(Hazard),
    SpeedLimit,
}

impl Hazard {
    pub const ALL: [Hazard; 4] = [
        Hazard::Stop,
        Hazard::OutOfGas,
        Hazard::FlatTire,
        Hazard::Accident,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Hazard::Stop => "Stop",
            Hazard::OutOfGas => "Out of Gas",
            Hazard::FlatTire => "Flat Tire",
            Hazard::Accident => "Accident",
        }
    }
}

impl Remedy {
    pub const ALL: [Remedy; 4] = [
        Remedy::Roll,
        Remedy::Gasoline,
        Remedy::SpareTire,
        Remedy::Repairs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Remedy::Roll => "Roll",
            Remedy::Gasoline => "Gasoline",
            Remedy::SpareTire => "Spare Tire",
            Remedy::Repairs => "Repairs",
        }
    }

    /// The single hazard this remedy cures.
    pub fn fixes(self) -> Hazard {
        match self {
            Remedy::Roll => Hazard::Stop,
            Remedy::Gasoline => Hazard::OutOfGas,
            Remedy::SpareTire => Hazard::FlatTire,
            Remedy::Repairs => Hazard::Accident,
        }
    }
}

impl Safety {
    pub const ALL: [Safety; 4] = [
        Safety::RightOfWay,
        Safety::ExtraTank,
        Safety::PunctureProof,
        Safety::DrivingAce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Safety::RightOfWay => "Right of Way",
            Safety::ExtraTank => "Extra Tank",
            Safety::PunctureProof => "Puncture-Proof",
            Safety::DrivingAce => "Driving Ace",
        }
    }

    /// Right of Way covers both Stop and Speed Limit; the others cover one hazard each.
    pub fn protects_against(self, threat: Threat) -> bool {
        matches!(
            (self, threat),
            (Safety::RightOfWay, Threat::Hazard(Hazard::Stop))
                | (Safety::RightOfWay, Threat::SpeedLimit)
                | (Safety::ExtraTank, Threat::Hazard(Hazard::OutOfGas))
                | (Safety::PunctureProof, Threat::Hazard(Hazard::FlatTire))
                | (Safety::DrivingAce, Threat::Hazard(Hazard::Accident))
        )
    }
}

/// A single road race card.
///
/// Cards are plain values: two cards with the same kind and name are
/// interchangeable, so "this card is in my hand" is value equality.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Card {
    /// Distance card carrying its kilometre value (25, 50, 75, 100 or 200)
    Distance(u16),
    Hazard(Hazard),
    Remedy(Remedy),
    Safety(Safety),
    SpeedLimit,
    EndLimit,
}

impl Card {
    pub fn kind(&self) -> CardKind {
        match self {
            Card::Distance(_) => CardKind::Distance,
            Card::Hazard(_) => CardKind::Hazard,
            Card::Remedy(_) => CardKind::Remedy,
            Card::Safety(_) => CardKind::Safety,
            Card::SpeedLimit => CardKind::SpeedLimit,
            Card::EndLimit => CardKind::EndLimit,
        }
    }

    /// Kilometre value; zero for everything but distance cards.
    pub fn value(&self) -> u32 {
        match self {
            Card::Distance(km) => u32::from(*km),
            _ => 0,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Card::Distance(km) => format!("{km} km"),
            Card::Hazard(h) => h.name().to_string(),
            Card::Remedy(r) => r.name().to_string(),
            Card::Safety(s) => s.name().to_string(),
            Card::SpeedLimit => "Speed Limit".to_string(),
            Card::EndLimit => "End Limit".to_string(),
        }
    }

    /// The threat this card poses when played on an opponent, if it is an attack.
    pub fn threat(&self) -> Option<Threat> {
        match self {
            Card::Hazard(h) => Some(Threat::Hazard(*h)),
            Card::SpeedLimit => Some(Threat::SpeedLimit),
            _ => None,
        }
    }

    /// True for the cards that are played onto the opponent.
    pub fn is_attack(&self) -> bool {
        self.threat().is_some()
    }

    /// Whether this remedy (or End Limit) cures the given hazard card.
    pub fn fixes(&self, hazard: &Card) -> bool {
        match (self, hazard) {
            (Card::Remedy(r), Card::Hazard(h)) => r.fixes() == *h,
            (Card::EndLimit, Card::SpeedLimit) => true,
            _ => false,
        }
    }

    /// Whether this safety shields against the given attack card.
    pub fn protects_against(&self, attack: &Card) -> bool {
        match (self, attack.threat()) {
            (Card::Safety(s), Some(threat)) => s.protects_against(threat),
            _ => false,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Composition of the standard 106-card deck as (card, copies).
pub const STANDARD_COMPOSITION: [(Card, usize); 19] = [
    (Card::Distance(25), 10),
    (Card::Distance(50), 10),
    (Card::Distance(75), 10),
    (Card::Distance(100), 12),
    (Card::Distance(200), 4),
    (Card::Hazard(Hazard::Stop), 5),
    (Card::Hazard(Hazard::OutOfGas), 3),
    (Card::Hazard(Hazard::FlatTire), 3),
    (Card::Hazard(Hazard::Accident), 3),
    (Card::SpeedLimit, 4),
    (Card::EndLimit, 6),
    (Card::Remedy(Remedy::Roll), 14),
    (Card::Remedy(Remedy::Gasoline), 6),
    (Card::Remedy(Remedy::SpareTire), 6),
    (Card::Remedy(Remedy::Repairs), 6),
    (Card::Safety(Safety::DrivingAce), 1),
    (Card::Safety(Safety::ExtraTank), 1),
    (Card::Safety(Safety::PunctureProof), 1),
    (Card::Safety(Safety::RightOfWay), 1),
];

pub fn full_deck() -> Vec<Card> {
    let size = STANDARD_COMPOSITION.iter().map(|(_, n)| n).sum();
    let mut v = Vec::with_capacity(size);
    for &(card, copies) in &STANDARD_COMPOSITION {
        v.extend(std::iter::repeat_n(card, copies));
    }
    v
}
