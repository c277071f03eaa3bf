//! Change notification for cart snapshots.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::snapshot::CartSnapshot;

type Listener = Arc<dyn Fn(&CartSnapshot) + Send + Sync>;

/// Registered listeners, invoked synchronously in registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Subscribers {
    pub(crate) fn subscribe(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    /// Delivers `snapshot` to every current listener.
    ///
    /// The listener list is copied first so a listener may subscribe or
    /// drop its own subscription while being called.
    pub(crate) fn notify(&self, snapshot: &CartSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by [`crate::CartSync::subscribe`].
///
/// Dropping it unregisters the listener; snapshots produced after the drop
/// are not delivered to it, even when they come from operations that were
/// already in flight.
#[must_use = "dropping the subscription immediately unregisters the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Subscribers>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}
