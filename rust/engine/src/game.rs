use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cards::{Card, Safety};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::logger::EventLog;
use crate::observer::{ObserverId, Observers, StateObserver};
use crate::player::{PlayerState, Seat, TRIP_LENGTH};
use crate::rules::{logical_target, validate_move, IllegalMove};
use crate::scoring::{score_round, ScoreBreakdown};

/// Cards dealt to each player at the start of a round.
pub const HAND_SIZE: usize = 6;

/// Cumulative score that decides a match unless configured otherwise.
pub const DEFAULT_MATCH_TARGET: u32 = 5000;

/// Step within a turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the current player to draw
    Draw,
    /// Waiting for the current player to play or discard
    Play,
}

/// Whether normal turn flow is suspended by a Coup Fourré window.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum Interrupt {
    Idle,
    /// `attacker` played `hazard` at `target`, who holds the matching safety.
    /// The hazard sits in limbo until the target resolves or declines.
    AwaitingCoupFourre {
        hazard: Card,
        attacker: Seat,
        target: Seat,
    },
}

/// What an accepted move did to the turn.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MoveOutcome {
    /// The card was applied and the turn passed to the opponent
    TurnEnded,
    /// A safety was laid down; the same player goes again
    ExtraTurn,
    /// The target may answer with a Coup Fourré before the card takes effect
    AwaitingCoupFourre { defender: Seat },
}

/// Both players' round scores, added to the match totals by [`GameManager::tally_round`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub player: ScoreBreakdown,
    pub ai: ScoreBreakdown,
    pub player_total: u32,
    pub ai_total: u32,
}

impl RoundSummary {
    pub fn score(&self, seat: Seat) -> &ScoreBreakdown {
        match seat {
            Seat::Player => &self.player,
            Seat::Ai => &self.ai,
        }
    }
}

/// Owns one match: the deck, both players, the turn state machine and the
/// Coup Fourré interrupt.
///
/// Every mutating operation checks its preconditions first and returns a
/// [`GameError`] without touching state when they fail. Observers are told
/// about every change that does go through.
///
/// # Examples
///
/// ```
/// use mille_engine::game::{GameManager, Phase};
///
/// let mut game = GameManager::new(Some(7));
/// game.start_new_round().expect("first round");
///
/// let seat = game.current_turn();
/// assert_eq!(game.phase(), Phase::Draw);
/// assert_eq!(game.player(seat).hand().len(), 6);
///
/// game.draw(seat).expect("draw");
/// assert_eq!(game.phase(), Phase::Play);
/// assert_eq!(game.player(seat).hand().len(), 7);
/// ```
#[derive(Debug)]
pub struct GameManager {
    deck: Deck,
    discard: Vec<Card>,
    players: [PlayerState; 2],
    current_turn: Seat,
    phase: Phase,
    interrupt: Interrupt,
    last_round_starter: Option<Seat>,
    /// Incremented on every round start; stale work compares against it
    round: u32,
    round_over: bool,
    round_tallied: bool,
    match_over: bool,
    match_target: u32,
    rng: ChaCha20Rng,
    log: EventLog,
    observers: Observers,
}

impl GameManager {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self {
            deck: Deck::stacked(Vec::new()),
            discard: Vec::new(),
            players: [
                PlayerState::new("Player 1"),
                PlayerState::new("AI Opponent"),
            ],
            current_turn: Seat::Player,
            phase: Phase::Draw,
            interrupt: Interrupt::Idle,
            last_round_starter: None,
            round: 0,
            round_over: true,
            round_tallied: true,
            match_over: false,
            match_target: DEFAULT_MATCH_TARGET,
            rng: ChaCha20Rng::seed_from_u64(seed),
            log: EventLog::default(),
            observers: Observers::default(),
        }
    }

    pub fn with_match_target(mut self, target: u32) -> Self {
        self.match_target = target;
        self
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat.index()]
    }

    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }

    pub fn current_turn(&self) -> Seat {
        self.current_turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt
    }

    pub fn is_awaiting_coup_fourre(&self) -> bool {
        matches!(self.interrupt, Interrupt::AwaitingCoupFourre { .. })
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn discard_pile(&self) -> &[Card] {
        &self.discard
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_round_over(&self) -> bool {
        self.round_over
    }

    pub fn is_round_tallied(&self) -> bool {
        self.round_tallied
    }

    pub fn is_match_over(&self) -> bool {
        self.match_over
    }

    pub fn match_target(&self) -> u32 {
        self.match_target
    }

    pub fn last_round_starter(&self) -> Option<Seat> {
        self.last_round_starter
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Rule book check with seats instead of player states.
    pub fn validate(&self, card: &Card, actor: Seat, target: Seat) -> Result<(), IllegalMove> {
        validate_move(card, self.player(actor), self.player(target))
    }

    /// Appends a line to the event log on behalf of `owner`.
    pub fn log_event(&mut self, owner: Seat, message: impl Into<String>) {
        self.log.push(owner, message);
        self.notify();
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Rebuilds and shuffles the deck, clears both tableaus and deals a fresh
    /// round. The first round of a match picks the starter at random; later
    /// rounds alternate.
    pub fn start_new_round(&mut self) -> Result<(), GameError> {
        if self.match_over {
            return Err(GameError::MatchOver);
        }
        let mut deck = Deck::new_with_seed(self.rng.next_u64());
        deck.shuffle();

        let (starter, announcement) = match self.last_round_starter {
            None => {
                let starter = if self.rng.random_bool(0.5) {
                    Seat::Player
                } else {
                    Seat::Ai
                };
                (
                    starter,
                    format!(
                        "Match start! {} was randomly selected to start.",
                        self.player(starter).name()
                    ),
                )
            }
            Some(previous) => {
                let starter = previous.opponent();
                (
                    starter,
                    format!("New round! {} starts.", self.player(starter).name()),
                )
            }
        };
        self.begin_round(deck, starter, announcement);
        Ok(())
    }

    /// Starts a round from a caller-supplied deck (dealt in order) and starter.
    pub fn start_round_with(&mut self, deck: Deck, starter: Seat) -> Result<(), GameError> {
        if self.match_over {
            return Err(GameError::MatchOver);
        }
        let announcement = format!("New round! {} starts.", self.player(starter).name());
        self.begin_round(deck, starter, announcement);
        Ok(())
    }

    fn begin_round(&mut self, deck: Deck, starter: Seat, announcement: String) {
        self.log.clear();
        self.discard.clear();
        for player in &mut self.players {
            player.reset();
        }
        self.deck = deck;
        self.interrupt = Interrupt::Idle;
        self.current_turn = starter;
        self.last_round_starter = Some(starter);
        self.phase = Phase::Draw;
        self.round += 1;
        self.round_over = false;
        self.round_tallied = false;

        for _ in 0..HAND_SIZE {
            for seat in Seat::BOTH {
                if let Some(card) = self.deck.draw() {
                    self.players[seat.index()].add_to_hand(card);
                }
            }
        }
        if self.deck.is_empty() {
            self.phase = Phase::Play;
        }

        self.log.push(starter, announcement);
        self.check_round_end();
        self.skip_stranded_player();
        self.notify();
    }

    /// Draw step of `seat`'s turn. With an empty deck the phase simply moves on.
    pub fn draw(&mut self, seat: Seat) -> Result<Option<Card>, GameError> {
        self.ensure_turn(seat, Phase::Draw)?;

        let drawn = self.deck.draw();
        if let Some(card) = drawn {
            self.players[seat.index()].add_to_hand(card);
            let line = format!("{} drew a card.", self.player(seat).name());
            self.log.push(seat, line);
        }
        self.phase = Phase::Play;
        self.check_round_end();
        self.skip_stranded_player();
        self.notify();
        Ok(drawn)
    }

    /// Validates and executes a move. `target` must be the opponent for
    /// hazards and speed limits and the actor for everything else.
    pub fn submit_move(
        &mut self,
        card: Card,
        actor: Seat,
        target: Seat,
    ) -> Result<MoveOutcome, GameError> {
        self.ensure_turn(actor, Phase::Play)?;
        let expected = logical_target(&card, actor);
        if target != expected {
            return Err(GameError::WrongTarget {
                card: card.name(),
                expected,
            });
        }
        if !self.player(actor).holds(&card) {
            return Err(GameError::CardNotInHand(card.name()));
        }
        self.validate(&card, actor, target)?;
        Ok(self.execute(card, actor, target))
    }

    fn execute(&mut self, card: Card, actor: Seat, target: Seat) -> MoveOutcome {
        self.players[actor.index()].remove_from_hand(&card);

        let line = if card.is_attack() {
            format!(
                "{} played {} on {}.",
                self.player(actor).name(),
                card,
                self.player(target).name()
            )
        } else {
            format!("{} played {}.", self.player(actor).name(), card)
        };
        self.log.push(actor, line);

        if card.is_attack() && self.player(target).counter_in_hand(&card).is_some() {
            self.interrupt = Interrupt::AwaitingCoupFourre {
                hazard: card,
                attacker: actor,
                target,
            };
            let line = format!("{} may call Coup Fourré!", self.player(target).name());
            self.log.push(target, line);
            self.notify();
            return MoveOutcome::AwaitingCoupFourre { defender: target };
        }

        self.resolve(card, actor, target)
    }

    /// Puts an accepted card on its pile and moves the turn along.
    fn resolve(&mut self, card: Card, actor: Seat, target: Seat) -> MoveOutcome {
        match card {
            Card::Distance(_) => {
                self.players[actor.index()].add_distance(card);
            }
            Card::Hazard(_) => self.players[target.index()].battle_pile_mut().push(card),
            Card::Remedy(_) => self.players[actor.index()].battle_pile_mut().push(card),
            Card::SpeedLimit => self.players[target.index()].speed_pile_mut().push(card),
            Card::EndLimit => self.players[actor.index()].speed_pile_mut().push(card),
            Card::Safety(safety) => {
                self.players[actor.index()].add_safety(safety);
                self.safety_cascade(actor, safety);
            }
        }

        if matches!(card, Card::Safety(_)) {
            self.phase = self.phase_for_new_turn();
            self.check_round_end();
            self.skip_stranded_player();
            self.notify();
            MoveOutcome::ExtraTurn
        } else {
            self.end_turn();
            MoveOutcome::TurnEnded
        }
    }

    /// A freshly laid safety throws out the matching attack sitting on top of
    /// either status pile.
    fn safety_cascade(&mut self, seat: Seat, safety: Safety) {
        let shield = Card::Safety(safety);
        let player = &mut self.players[seat.index()];

        if let Some(top) = player.battle_pile().top().copied() {
            if shield.protects_against(&top) {
                player.battle_pile_mut().pop_top();
                self.discard.push(top);
            }
        }
        if let Some(top) = player.speed_pile().top().copied() {
            if shield.protects_against(&top) {
                player.speed_pile_mut().pop_top();
                self.discard.push(top);
            }
        }
    }

    /// Plays the matching safety out of turn, cancelling the pending hazard and
    /// taking the turn.
    pub fn resolve_coup_fourre(&mut self, defender: Seat) -> Result<Card, GameError> {
        let (hazard, attacker) = self.pending_against(defender)?;
        let safety_card = self
            .player(defender)
            .counter_in_hand(&hazard)
            .ok_or(GameError::NoMatchingSafety)?;
        let Card::Safety(safety) = safety_card else {
            return Err(GameError::NoMatchingSafety);
        };

        let player = &mut self.players[defender.index()];
        player.remove_from_hand(&safety_card);
        player.add_safety(safety);
        player.record_coup_fourre();
        self.safety_cascade(defender, safety);
        self.discard.push(hazard);
        self.interrupt = Interrupt::Idle;

        if let Some(bonus) = self.deck.draw() {
            self.players[defender.index()].add_to_hand(bonus);
        }
        self.current_turn = defender;
        self.phase = self.phase_for_new_turn();

        let line = format!(
            "COUP FOURRÉ! {} answered {}'s {} with {}!",
            self.player(defender).name(),
            self.player(attacker).name(),
            hazard,
            safety_card
        );
        self.log.push(defender, line);
        self.check_round_end();
        self.skip_stranded_player();
        self.notify();
        Ok(safety_card)
    }

    /// Lets the pending hazard through; the attacker's turn then ends normally.
    pub fn decline_coup_fourre(&mut self, defender: Seat) -> Result<(), GameError> {
        let (hazard, attacker) = self.pending_against(defender)?;
        self.interrupt = Interrupt::Idle;
        let line = format!("{} lets the {} through.", self.player(defender).name(), hazard);
        self.log.push(defender, line);
        self.resolve(hazard, attacker, defender);
        Ok(())
    }

    fn pending_against(&self, defender: Seat) -> Result<(Card, Seat), GameError> {
        if self.match_over {
            return Err(GameError::MatchOver);
        }
        match self.interrupt {
            Interrupt::Idle => Err(GameError::NoPendingInterrupt),
            Interrupt::AwaitingCoupFourre { target, .. } if target != defender => {
                Err(GameError::NotTheDefender(defender))
            }
            Interrupt::AwaitingCoupFourre {
                hazard, attacker, ..
            } => Ok((hazard, attacker)),
        }
    }

    /// Throws a card away instead of playing, ending the turn.
    pub fn discard(&mut self, card: Card, seat: Seat) -> Result<(), GameError> {
        self.ensure_turn(seat, Phase::Play)?;
        if !self.players[seat.index()].remove_from_hand(&card) {
            return Err(GameError::CardNotInHand(card.name()));
        }
        self.discard.push(card);
        let line = format!("{} discarded a card.", self.player(seat).name());
        self.log.push(seat, line);
        self.end_turn();
        Ok(())
    }

    fn ensure_turn(&self, seat: Seat, phase: Phase) -> Result<(), GameError> {
        if self.match_over {
            return Err(GameError::MatchOver);
        }
        if self.round_over {
            return Err(GameError::RoundOver);
        }
        if self.is_awaiting_coup_fourre() {
            return Err(GameError::InterruptPending);
        }
        if seat != self.current_turn {
            return Err(GameError::NotYourTurn {
                expected: self.current_turn,
                actual: seat,
            });
        }
        if phase != self.phase {
            return Err(GameError::WrongPhase {
                expected: phase,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn phase_for_new_turn(&self) -> Phase {
        if self.deck.is_empty() {
            Phase::Play
        } else {
            Phase::Draw
        }
    }

    fn end_turn(&mut self) {
        self.current_turn = self.current_turn.opponent();
        self.phase = self.phase_for_new_turn();
        self.check_round_end();
        self.skip_stranded_player();
        self.notify();
    }

    /// With the deck gone, a player holding nothing can neither play nor
    /// discard, so the turn goes straight back to the opponent.
    fn skip_stranded_player(&mut self) {
        if self.round_over || !self.deck.is_empty() || self.is_awaiting_coup_fourre() {
            return;
        }
        let seat = self.current_turn;
        if self.player(seat).hand().is_empty() {
            let line = format!("{} has no cards left and passes.", self.player(seat).name());
            self.log.push(seat, line);
            self.current_turn = seat.opponent();
            self.phase = Phase::Play;
        }
    }

    fn check_round_end(&mut self) {
        if self.round_over {
            return;
        }
        let finisher = Seat::BOTH
            .into_iter()
            .find(|seat| self.player(*seat).total_distance() == TRIP_LENGTH);
        let exhausted = self.deck.is_empty() && self.players.iter().all(|p| p.hand().is_empty());

        if let Some(seat) = finisher {
            self.round_over = true;
            let line = format!(
                "{} completed the {} km trip!",
                self.player(seat).name(),
                TRIP_LENGTH
            );
            self.log.push(seat, line);
        } else if exhausted {
            self.round_over = true;
            self.log
                .push(self.current_turn, "All cards are played. The round is over.");
        }
    }

    /// Round score of `seat` from the current state.
    pub fn score_breakdown(&self, seat: Seat) -> ScoreBreakdown {
        score_round(
            self.player(seat),
            self.player(seat.opponent()),
            self.deck.is_empty(),
        )
    }

    pub fn compute_score(&self, seat: Seat) -> u32 {
        self.score_breakdown(seat).total()
    }

    /// Adds both round scores to the match totals. Allowed once per finished round.
    pub fn tally_round(&mut self) -> Result<RoundSummary, GameError> {
        if !self.round_over {
            return Err(GameError::RoundInProgress);
        }
        if self.round_tallied {
            return Err(GameError::RoundAlreadyTallied);
        }
        let player = self.score_breakdown(Seat::Player);
        let ai = self.score_breakdown(Seat::Ai);
        self.players[Seat::Player.index()].add_match_points(player.total());
        self.players[Seat::Ai.index()].add_match_points(ai.total());
        self.round_tallied = true;

        let summary = RoundSummary {
            round: self.round,
            player,
            ai,
            player_total: self.player(Seat::Player).match_score(),
            ai_total: self.player(Seat::Ai).match_score(),
        };
        for seat in Seat::BOTH {
            let line = format!(
                "{} scores {} this round ({} total).",
                self.player(seat).name(),
                summary.score(seat).total(),
                self.player(seat).match_score()
            );
            self.log.push(seat, line);
        }
        self.notify();
        Ok(summary)
    }

    /// The seat that has reached the match target with the higher total, if any.
    pub fn match_leader(&self) -> Option<Seat> {
        let player = self.player(Seat::Player).match_score();
        let ai = self.player(Seat::Ai).match_score();
        if player.max(ai) < self.match_target || player == ai {
            return None;
        }
        Some(if player > ai { Seat::Player } else { Seat::Ai })
    }

    pub fn end_match(&mut self) {
        if self.match_over {
            return;
        }
        self.match_over = true;
        let owner = self.match_leader().unwrap_or(self.current_turn);
        self.log.push(owner, "Match over.");
        self.notify();
    }

    /// Forgets totals and the starter so the next round opens a new match.
    pub fn reset_match(&mut self) {
        for player in &mut self.players {
            player.clear_match_score();
        }
        self.last_round_starter = None;
        self.match_over = false;
        self.round_over = true;
        self.interrupt = Interrupt::Idle;
        self.notify();
    }

    fn notify(&self) {
        self.observers.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_is_playable_before_the_first_round() {
        let mut game = GameManager::new(Some(1));
        assert_eq!(game.round(), 0);
        assert!(game.is_round_over());
        assert_eq!(game.draw(Seat::Player), Err(GameError::RoundOver));
    }

    #[test]
    fn starters_alternate_after_the_first_round() {
        let mut game = GameManager::new(Some(99));
        game.start_new_round().expect("round 1");
        let first = game.current_turn();
        game.start_new_round().expect("round 2");
        assert_eq!(game.current_turn(), first.opponent());
        game.start_new_round().expect("round 3");
        assert_eq!(game.current_turn(), first);
        assert_eq!(game.round(), 3);
    }

    #[test]
    fn same_seed_deals_the_same_round() {
        let mut a = GameManager::new(Some(5));
        let mut b = GameManager::new(Some(5));
        a.start_new_round().expect("a");
        b.start_new_round().expect("b");
        assert_eq!(a.current_turn(), b.current_turn());
        assert_eq!(a.player(Seat::Player).hand(), b.player(Seat::Player).hand());
        assert_eq!(a.deck_remaining(), 106 - 2 * HAND_SIZE);
    }

    #[test]
    fn match_leader_needs_the_target_and_a_lead() {
        let mut game = GameManager::new(Some(3)).with_match_target(1000);
        assert_eq!(game.match_leader(), None);
        game.players[0].add_match_points(1200);
        game.players[1].add_match_points(900);
        assert_eq!(game.match_leader(), Some(Seat::Player));
        game.players[1].add_match_points(300);
        assert_eq!(game.match_leader(), None);
    }

    #[test]
    fn end_match_blocks_new_rounds_until_reset() {
        let mut game = GameManager::new(Some(3));
        game.end_match();
        assert!(game.is_match_over());
        assert_eq!(game.start_new_round(), Err(GameError::MatchOver));
        game.reset_match();
        assert!(game.start_new_round().is_ok());
    }
}
