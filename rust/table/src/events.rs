use crate::session::TableId;
use mille_engine::game::RoundSummary;
use mille_engine::observer::StateObserver;
use mille_engine::player::Seat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;

// Bounded so a subscriber that stops reading cannot grow memory without limit
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<TableEvent>;
pub type EventReceiver = mpsc::Receiver<TableEvent>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// Something in the game changed; re-read the snapshot
    StateChanged { table_id: TableId },
    RoundTallied {
        table_id: TableId,
        summary: RoundSummary,
    },
    MatchEnded {
        table_id: TableId,
        winner: Option<Seat>,
    },
    /// The automated opponent failed and its turn was forced
    AiFault { table_id: TableId, message: String },
    TableClosed { table_id: TableId, reason: String },
}

pub struct EventSubscription {
    bus: EventBus,
    table_id: TableId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.table_id, self.subscriber_id);
    }
}

/// Per-table fan-out of [`TableEvent`]s over bounded channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<TableId, Vec<(usize, EventSender)>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, table_id: TableId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(table_id.clone());
        EventSubscription {
            bus: self.clone(),
            table_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, table_id: TableId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.entry(table_id.clone()).or_default().push((id, tx));

        tracing::info!(
            table_id = %table_id,
            subscriber_id = id,
            "client subscribed to table events"
        );

        (id, rx)
    }

    /// Non-blocking: a subscriber whose channel is full or closed is dropped.
    pub fn broadcast(&self, table_id: &TableId, event: TableEvent) {
        tracing::trace!(table_id = %table_id, event = ?event, "broadcasting table event");

        let subscribers = {
            let guard = self
                .inner
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get(table_id).cloned()
        };

        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    table_id = %table_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping subscriber that cannot take events"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(table_id, &failed);
        }
    }

    pub fn unsubscribe(&self, table_id: &TableId, subscriber_id: usize) {
        self.remove_subscribers(table_id, &[subscriber_id]);
    }

    pub fn drop_table(&self, table_id: &TableId) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.remove(table_id);
    }

    pub fn subscriber_count(&self) -> usize {
        let guard = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, table_id: &TableId, ids: &[usize]) {
        let mut guard = self
            .inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(list) = guard.get_mut(table_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(table_id);
            }
        }
    }
}

/// Bridges the engine's synchronous observer list onto the bus. Only enqueues,
/// so it never calls back into the game.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    bus: EventBus,
    table_id: TableId,
}

impl ChannelObserver {
    pub fn new(bus: EventBus, table_id: TableId) -> Self {
        Self { bus, table_id }
    }
}

impl StateObserver for ChannelObserver {
    fn state_changed(&self) {
        self.bus.broadcast(
            &self.table_id,
            TableEvent::StateChanged {
                table_id: self.table_id.clone(),
            },
        );
    }
}
