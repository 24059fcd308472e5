//! State listeners and lightweight signals
//!
//! Components that care about state transitions join an explicit registry and
//! get a handle back; dropping out is `leave(handle)`. Broadcasts run every
//! member synchronously. A member that returns an error is logged and
//! recorded, and the fan-out carries on with the rest.

use super::state::{GameState, PlayerState};
use crate::error::{ListenerError, ListenerFailure};

/// Reacts to global game state transitions
pub trait GameStateListener {
    fn on_game_state_change(&mut self, state: GameState) -> Result<(), ListenerError>;
}

/// Reacts to player state transitions
pub trait PlayerStateListener {
    fn on_player_state_change(&mut self, state: PlayerState) -> Result<(), ListenerError>;
}

/// Handle returned when joining a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Entry<L: ?Sized> {
    id: ListenerId,
    name: String,
    listener: Box<L>,
}

/// Explicit set of live listeners of one capability
pub struct ListenerRegistry<L: ?Sized> {
    next_id: u64,
    entries: Vec<Entry<L>>,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; it receives every broadcast until it leaves
    pub fn join(&mut self, name: impl Into<String>, listener: Box<L>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            name: name.into(),
            listener,
        });
        id
    }

    /// Remove a listener, handing it back to the caller
    pub fn leave(&mut self, id: ListenerId) -> Option<Box<L>> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).listener)
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Call every member once. Failures don't stop the fan-out.
    pub fn broadcast<F>(&mut self, what: &str, mut call: F) -> Vec<ListenerFailure>
    where
        F: FnMut(&mut L) -> Result<(), ListenerError>,
    {
        let mut failures = Vec::new();
        for entry in &mut self.entries {
            if let Err(error) = call(entry.listener.as_mut()) {
                log::error!("Listener '{}' failed on {}: {}", entry.name, what, error);
                failures.push(ListenerFailure {
                    listener: entry.name.clone(),
                    broadcast: what.to_string(),
                    error,
                });
            }
        }
        failures
    }
}

pub type GameStateListeners = ListenerRegistry<dyn GameStateListener>;
pub type PlayerStateListeners = ListenerRegistry<dyn PlayerStateListener>;

impl GameStateListeners {
    pub fn notify(&mut self, state: GameState) -> Vec<ListenerFailure> {
        let what = format!("GameState::{state:?}");
        self.broadcast(&what, |l| l.on_game_state_change(state))
    }
}

impl PlayerStateListeners {
    pub fn notify(&mut self, state: PlayerState) -> Vec<ListenerFailure> {
        let what = format!("PlayerState::{state:?}");
        self.broadcast(&what, |l| l.on_player_state_change(state))
    }
}

/// Handle returned by [`Signal::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Lightweight multicast callback list
pub struct Signal<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(T)>)>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            subscribers: Vec::new(),
        }
    }
}

impl<T: Copy> Signal<T> {
    pub fn subscribe(&mut self, callback: impl FnMut(T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, value: T) {
        for (_, callback) in &mut self.subscribers {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
