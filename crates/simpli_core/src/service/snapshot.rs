//! Single-threaded "current value" channels.
//!
//! # Responsibility
//! - Hold the latest published snapshot for presentation reads.
//! - Push every new snapshot to subscribed listeners synchronously.
//!
//! # Invariants
//! - Listeners run on the publishing thread, in subscription order.
//! - `current()` always returns the last published value.

use std::fmt::{Debug, Formatter};

/// Handle returned by [`SnapshotChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// Latest-value holder with synchronous fan-out.
pub struct SnapshotChannel<T> {
    current: T,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T> SnapshotChannel<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Replaces the current value and notifies every listener.
    pub fn publish(&mut self, value: T) {
        self.current = value;
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
    }

    /// Registers a listener. It is not called with the current value.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` for unknown or already removed ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Default> Default for SnapshotChannel<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for SnapshotChannel<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotChannel")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
