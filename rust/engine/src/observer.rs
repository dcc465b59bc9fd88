use std::fmt;
use std::sync::Arc;

/// Receives a payload-free signal after every state change; the observer
/// re-reads whatever it needs.
///
/// Callbacks run synchronously while the game manager is mid-operation and
/// must not call back into it.
pub trait StateObserver: Send + Sync {
    fn state_changed(&self);
}

impl<F> StateObserver for F
where
    F: Fn() + Send + Sync,
{
    fn state_changed(&self) {
        self()
    }
}

pub type ObserverId = usize;

/// Subscriber list owned by the game manager.
#[derive(Default)]
pub struct Observers {
    list: Vec<(ObserverId, Arc<dyn StateObserver>)>,
    next_id: ObserverId,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.list.len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.list.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.list.len();
        self.list.retain(|(existing, _)| *existing != id);
        self.list.len() != before
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn notify(&self) {
        for (_, observer) in &self.list {
            observer.state_changed();
        }
    }
}
