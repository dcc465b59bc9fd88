use crate::errors::TableError;
use crate::events::{ChannelObserver, EventBus, TableEvent};
use crate::settings::TableSettings;
use mille_ai::baseline::lowest_weight;
use mille_ai::{create_ai, create_ai_with_seed, seat_to_act, Strategy, StrategyError};
use mille_engine::cards::{Card, Safety};
use mille_engine::game::{GameManager, Interrupt, MoveOutcome, Phase, RoundSummary};
use mille_engine::logger::LogEntry;
use mille_engine::player::Seat;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use uuid::Uuid;

pub type TableId = String;

/// Owns every open table and the bus their events go out on.
#[derive(Debug)]
pub struct SessionManager {
    tables: RwLock<HashMap<TableId, Arc<Table>>>,
    event_bus: EventBus,
    settings: TableSettings,
}

impl SessionManager {
    pub fn new(settings: TableSettings) -> Self {
        Self::with_event_bus(settings, EventBus::new())
    }

    pub fn with_event_bus(settings: TableSettings, event_bus: EventBus) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            event_bus,
            settings,
        }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> EventBus {
        self.event_bus.clone()
    }

    pub fn create_table(&self) -> Result<Arc<Table>, TableError> {
        let settings = self.settings.clone();
        self.create_table_with(&settings)
    }

    /// Opens a table with its own settings and deals the first round.
    pub fn create_table_with(&self, settings: &TableSettings) -> Result<Arc<Table>, TableError> {
        let strategy = match settings.seed {
            Some(seed) => create_ai_with_seed(&settings.ai_strategy, seed),
            None => create_ai(&settings.ai_strategy),
        }
        .map_err(|_| TableError::UnknownStrategy(settings.ai_strategy.clone()))?;
        self.create_table_with_strategy(settings, strategy)
    }

    /// Opens a table whose AI seat is played by `strategy`; `ai_strategy` in
    /// the settings is ignored.
    pub fn create_table_with_strategy(
        &self,
        settings: &TableSettings,
        strategy: Box<dyn Strategy>,
    ) -> Result<Arc<Table>, TableError> {
        let id = Uuid::new_v4().to_string();
        tracing::info!(
            table_id = %id,
            strategy = strategy.name(),
            seed = ?settings.seed,
            match_target = settings.match_target,
            "creating new table"
        );

        let table = Table::new(id.clone(), settings, strategy, self.event_bus.clone());
        {
            let mut guard = self
                .tables
                .write()
                .map_err(|_| TableError::StoragePoisoned)?;
            guard.insert(id.clone(), Arc::clone(&table));
        }

        if let Err(err) = table.start_round() {
            if let Err(cleanup_err) = self.close_table(&id, "first round failed") {
                tracing::error!(
                    table_id = %id,
                    error = %cleanup_err,
                    "failed to roll back table after deal failure"
                );
            }
            return Err(err);
        }
        Ok(table)
    }

    pub fn get_table(&self, id: &TableId) -> Result<Arc<Table>, TableError> {
        let guard = self
            .tables
            .read()
            .map_err(|_| TableError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| TableError::SessionNotFound(id.clone()))
    }

    /// Stops the table's automated opponent and tells subscribers it is gone.
    pub fn close_table(&self, id: &TableId, reason: &str) -> Result<(), TableError> {
        let table = {
            let mut guard = self
                .tables
                .write()
                .map_err(|_| TableError::StoragePoisoned)?;
            guard
                .remove(id)
                .ok_or_else(|| TableError::SessionNotFound(id.clone()))?
        };
        table.close();

        tracing::info!(table_id = %id, reason, "table closed");
        self.event_bus.broadcast(
            id,
            TableEvent::TableClosed {
                table_id: id.clone(),
                reason: reason.to_string(),
            },
        );
        self.event_bus.drop_table(id);
        Ok(())
    }

    pub fn active_tables(&self) -> Vec<TableId> {
        match self.tables.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Public view of one seat. Hands are never included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub seat: Seat,
    pub name: String,
    pub hand_size: usize,
    pub battle_top: Option<Card>,
    pub speed_top: Option<Card>,
    pub safeties: Vec<Safety>,
    pub distance: u32,
    pub two_hundreds: usize,
    pub coup_fourres: u32,
    pub can_move: bool,
    pub speed_limited: bool,
    /// Round score as it would be tallied right now
    pub round_score: u32,
    pub match_score: u32,
}

/// Everything a client needs to draw the table for the human seat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    pub table_id: TableId,
    pub round: u32,
    pub phase: Phase,
    pub current_turn: Seat,
    pub interrupt: Interrupt,
    /// The human player's hand
    pub hand: Vec<Card>,
    pub deck_remaining: usize,
    pub discard_top: Option<Card>,
    pub discard_count: usize,
    pub player: SeatView,
    pub ai: SeatView,
    pub round_over: bool,
    pub round_tallied: bool,
    pub match_over: bool,
    pub match_target: u32,
    pub ai_thinking: bool,
    pub log: Vec<LogEntry>,
}

enum AiStep {
    /// The opponent still has to act
    Again,
    Done,
    /// Recovery failed; nothing more is scheduled until the next round
    Stalled,
}

/// One human-versus-AI game plus the task that plays the AI seat.
///
/// Every operation takes the game lock for its whole duration, so the human
/// and the automated opponent never interleave inside a mutation. The AI
/// plays from a spawned task after `think_delay`; starting a round, ending
/// the match or closing the table advances `round_epoch`, which cancels any
/// think step still waiting.
pub struct Table {
    id: TableId,
    game: Mutex<GameManager>,
    strategy: Box<dyn Strategy>,
    think_delay: Duration,
    round_epoch: watch::Sender<u64>,
    ai_running: AtomicBool,
    closed: AtomicBool,
    idle: Notify,
    bus: EventBus,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("strategy", &self.strategy.name())
            .field("think_delay", &self.think_delay)
            .field("round_epoch", &*self.round_epoch.borrow())
            .field("ai_running", &self.ai_running.load(Ordering::Acquire))
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Table {
    fn new(
        id: TableId,
        settings: &TableSettings,
        strategy: Box<dyn Strategy>,
        bus: EventBus,
    ) -> Arc<Self> {
        let mut game = GameManager::new(settings.seed).with_match_target(settings.match_target);
        game.subscribe(Arc::new(ChannelObserver::new(bus.clone(), id.clone())));
        let (round_epoch, _) = watch::channel(0);
        Arc::new(Self {
            id,
            game: Mutex::new(game),
            strategy,
            think_delay: settings.think_delay(),
            round_epoch,
            ai_running: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            idle: Notify::new(),
            bus,
        })
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn round_epoch(&self) -> u64 {
        *self.round_epoch.borrow()
    }

    pub fn is_ai_thinking(&self) -> bool {
        self.ai_running.load(Ordering::Acquire)
    }

    fn lock(&self) -> Result<MutexGuard<'_, GameManager>, TableError> {
        self.game.lock().map_err(|_| TableError::StoragePoisoned)
    }

    /// Runs `f` against the game without mutating it.
    pub fn read<R>(&self, f: impl FnOnce(&GameManager) -> R) -> Result<R, TableError> {
        let game = self.lock()?;
        Ok(f(&game))
    }

    pub fn snapshot(&self) -> Result<TableSnapshot, TableError> {
        let game = self.lock()?;
        let discard = game.discard_pile();
        Ok(TableSnapshot {
            table_id: self.id.clone(),
            round: game.round(),
            phase: game.phase(),
            current_turn: game.current_turn(),
            interrupt: game.interrupt(),
            hand: game.player(Seat::Player).hand().to_vec(),
            deck_remaining: game.deck_remaining(),
            discard_top: discard.last().copied(),
            discard_count: discard.len(),
            player: seat_view(&game, Seat::Player),
            ai: seat_view(&game, Seat::Ai),
            round_over: game.is_round_over(),
            round_tallied: game.is_round_tallied(),
            match_over: game.is_match_over(),
            match_target: game.match_target(),
            ai_thinking: self.is_ai_thinking(),
            log: game.log().entries().cloned().collect(),
        })
    }

    /// Deals a fresh round. Any think step from the previous round is dropped.
    pub fn start_round(self: &Arc<Self>) -> Result<(), TableError> {
        let mut game = self.lock()?;
        self.advance_epoch();
        game.start_new_round()?;
        tracing::info!(
            table_id = %self.id,
            round = game.round(),
            starter = %game.current_turn(),
            "round started"
        );
        self.schedule_ai(&game);
        Ok(())
    }

    pub fn draw(self: &Arc<Self>) -> Result<Option<Card>, TableError> {
        self.act("draw", |game| game.draw(Seat::Player))
    }

    pub fn submit_move(self: &Arc<Self>, card: Card, target: Seat) -> Result<MoveOutcome, TableError> {
        self.act("play", |game| game.submit_move(card, Seat::Player, target))
    }

    pub fn discard(self: &Arc<Self>, card: Card) -> Result<(), TableError> {
        self.act("discard", |game| game.discard(card, Seat::Player))
    }

    pub fn coup_fourre(self: &Arc<Self>) -> Result<Card, TableError> {
        self.act("coup_fourre", |game| game.resolve_coup_fourre(Seat::Player))
    }

    pub fn decline_coup_fourre(self: &Arc<Self>) -> Result<(), TableError> {
        self.act("decline_coup_fourre", |game| {
            game.decline_coup_fourre(Seat::Player)
        })
    }

    fn act<R>(
        self: &Arc<Self>,
        action: &'static str,
        f: impl FnOnce(&mut GameManager) -> Result<R, mille_engine::errors::GameError>,
    ) -> Result<R, TableError> {
        let mut game = self.lock()?;
        match f(&mut game) {
            Ok(out) => {
                self.schedule_ai(&game);
                Ok(out)
            }
            Err(err) => {
                let err = TableError::from(err);
                tracing::debug!(
                    table_id = %self.id,
                    action,
                    code = err.code(),
                    error = %err,
                    "rejected player action"
                );
                Err(err)
            }
        }
    }

    /// Adds the finished round to the match totals and ends the match when
    /// a seat has reached the target.
    pub fn finish_round(&self) -> Result<RoundSummary, TableError> {
        let mut game = self.lock()?;
        let summary = game.tally_round()?;
        tracing::info!(
            table_id = %self.id,
            round = summary.round,
            player_score = summary.player.total(),
            ai_score = summary.ai.total(),
            player_total = summary.player_total,
            ai_total = summary.ai_total,
            "round tallied"
        );
        self.bus.broadcast(
            &self.id,
            TableEvent::RoundTallied {
                table_id: self.id.clone(),
                summary,
            },
        );
        if game.match_leader().is_some() {
            self.close_match(&mut game);
        }
        Ok(summary)
    }

    pub fn end_match(&self) -> Result<(), TableError> {
        let mut game = self.lock()?;
        if !game.is_match_over() {
            self.close_match(&mut game);
        }
        Ok(())
    }

    /// Clears the totals and deals the first round of a new match.
    pub fn reset_match(self: &Arc<Self>) -> Result<(), TableError> {
        let mut game = self.lock()?;
        self.advance_epoch();
        game.reset_match();
        game.start_new_round()?;
        tracing::info!(table_id = %self.id, "match reset");
        self.schedule_ai(&game);
        Ok(())
    }

    fn close_match(&self, game: &mut GameManager) {
        self.advance_epoch();
        game.end_match();
        let winner = game.match_leader();
        tracing::info!(table_id = %self.id, winner = ?winner, "match ended");
        self.bus.broadcast(
            &self.id,
            TableEvent::MatchEnded {
                table_id: self.id.clone(),
                winner,
            },
        );
    }

    /// Waits until no automated step is running or scheduled.
    pub async fn settle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_ai_thinking() {
                return;
            }
            notified.await;
        }
    }

    /// Cancels the pending think step for good.
    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.advance_epoch();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn advance_epoch(&self) {
        self.round_epoch.send_modify(|epoch| *epoch += 1);
    }

    /// Spawns the think task when the AI seat is on the move. Called with the
    /// game lock held.
    fn schedule_ai(self: &Arc<Self>, game: &GameManager) {
        if self.is_closed() || seat_to_act(game) != Some(Seat::Ai) {
            return;
        }
        if self.ai_running.swap(true, Ordering::AcqRel) {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            self.ai_running.store(false, Ordering::Release);
            tracing::warn!(table_id = %self.id, "no async runtime; automated turn not scheduled");
            return;
        };

        let round = self.round_epoch.subscribe();
        let epoch = *round.borrow();
        tracing::debug!(
            table_id = %self.id,
            epoch,
            delay_ms = self.think_delay.as_millis() as u64,
            "scheduling automated turn"
        );
        let table = Arc::clone(self);
        runtime.spawn(async move { table.think(epoch, round).await });
    }

    async fn think(self: Arc<Self>, epoch: u64, mut round: watch::Receiver<u64>) {
        let mut stalled = false;
        loop {
            if !self.pause(&mut round).await {
                tracing::debug!(table_id = %self.id, epoch, "automated turn cancelled");
                break;
            }
            match self.ai_step(epoch) {
                Ok(AiStep::Again) => continue,
                Ok(AiStep::Done) => break,
                Ok(AiStep::Stalled) => {
                    stalled = true;
                    break;
                }
                Err(err) => {
                    tracing::error!(table_id = %self.id, error = %err, "automated turn aborted");
                    stalled = true;
                    break;
                }
            }
        }
        self.finish_thinking(stalled);
    }

    /// Sleeps for the think delay. False when the epoch moved meanwhile.
    async fn pause(&self, round: &mut watch::Receiver<u64>) -> bool {
        if self.think_delay.is_zero() {
            tokio::task::yield_now().await;
            return !round.has_changed().unwrap_or(true);
        }
        tokio::select! {
            _ = tokio::time::sleep(self.think_delay) => !round.has_changed().unwrap_or(true),
            _ = round.changed() => false,
        }
    }

    fn ai_step(&self, epoch: u64) -> Result<AiStep, TableError> {
        let mut game = self.lock()?;
        if *self.round_epoch.borrow() != epoch || seat_to_act(&game) != Some(Seat::Ai) {
            tracing::warn!(
                table_id = %self.id,
                epoch,
                current_epoch = *self.round_epoch.borrow(),
                "discarding stale automated step"
            );
            return Ok(AiStep::Done);
        }

        let result = if game.is_awaiting_coup_fourre() {
            self.answer_coup_fourre(&mut game)
        } else if game.phase() == Phase::Draw {
            game.draw(Seat::Ai)
                .map(|_| ())
                .map_err(StrategyError::from)
        } else {
            self.play(&mut game)
        };

        if let Err(fault) = result {
            if !self.recover(&mut game, &fault) {
                return Ok(AiStep::Stalled);
            }
        }

        Ok(if seat_to_act(&game) == Some(Seat::Ai) {
            AiStep::Again
        } else {
            AiStep::Done
        })
    }

    fn answer_coup_fourre(&self, game: &mut GameManager) -> Result<(), StrategyError> {
        let view: &GameManager = game;
        let accepts = catch_unwind(AssertUnwindSafe(|| {
            self.strategy.accepts_coup_fourre(view, Seat::Ai)
        }))
        .unwrap_or(true);

        if accepts {
            let safety = game.resolve_coup_fourre(Seat::Ai)?;
            tracing::info!(table_id = %self.id, card = %safety, "automated coup fourré");
        } else {
            game.decline_coup_fourre(Seat::Ai)?;
            tracing::debug!(table_id = %self.id, "automated opponent let the hazard through");
        }
        Ok(())
    }

    fn play(&self, game: &mut GameManager) -> Result<(), StrategyError> {
        let view: &GameManager = game;
        let decision = catch_unwind(AssertUnwindSafe(|| self.strategy.decide(view, Seat::Ai)))
            .map_err(|payload| StrategyError::Internal(panic_message(payload.as_ref())))??;

        tracing::debug!(
            table_id = %self.id,
            strategy = self.strategy.name(),
            decision = ?decision,
            "automated decision"
        );
        decision.apply(game, Seat::Ai)?;
        Ok(())
    }

    /// Contains a strategy failure: reports it and forces the lowest-value
    /// discard so the round keeps moving. False when even that is impossible.
    fn recover(&self, game: &mut GameManager, fault: &StrategyError) -> bool {
        tracing::error!(
            table_id = %self.id,
            strategy = self.strategy.name(),
            error = %fault,
            "automated opponent failed; forcing a discard"
        );
        game.log_event(Seat::Ai, format!("AI Error: {fault}"));
        self.bus.broadcast(
            &self.id,
            TableEvent::AiFault {
                table_id: self.id.clone(),
                message: fault.to_string(),
            },
        );

        if game.is_awaiting_coup_fourre() {
            return game.decline_coup_fourre(Seat::Ai).is_ok();
        }
        if game.phase() != Phase::Play {
            return false;
        }
        let Some(card) = lowest_weight(game.player(Seat::Ai).hand()) else {
            return false;
        };
        match game.discard(card, Seat::Ai) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(table_id = %self.id, error = %err, "forced discard rejected");
                false
            }
        }
    }

    fn finish_thinking(self: &Arc<Self>, stalled: bool) {
        match self.game.lock() {
            Ok(game) => {
                self.ai_running.store(false, Ordering::Release);
                if !stalled {
                    self.schedule_ai(&game);
                }
            }
            Err(_) => self.ai_running.store(false, Ordering::Release),
        }
        self.idle.notify_waiters();
    }
}

fn seat_view(game: &GameManager, seat: Seat) -> SeatView {
    let state = game.player(seat);
    SeatView {
        seat,
        name: state.name().to_string(),
        hand_size: state.hand().len(),
        battle_top: state.battle_pile().top().copied(),
        speed_top: state.speed_pile().top().copied(),
        safeties: state.safety_area().to_vec(),
        distance: state.total_distance(),
        two_hundreds: state.two_hundreds_played(),
        coup_fourres: state.coup_fourre_count(),
        can_move: state.can_move(),
        speed_limited: state.is_speed_limited(),
        round_score: game.compute_score(seat),
        match_score: state.match_score(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "strategy panicked".to_string()
    }
}
