//! Observer Registry
//!
//! Fan-out of refreshed payloads to registered observers. The registry only
//! holds weak references: an observer that is dropped without deregistering
//! is skipped and pruned on the next fan-out.

use crate::observability::metrics;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use tracing::trace;

/// Receives every successfully refreshed payload.
///
/// `on_notify` runs on the notifying task and delays the rest of the fan-out
/// and the refresh loop, so implementations must return promptly and hand
/// longer work to a spawned task.
pub trait Observer<T>: Send + Sync {
    fn on_notify(&self, data: &T);
}

pub struct ObserverRegistry<T> {
    observers: RwLock<Vec<Weak<dyn Observer<T>>>>,
}

impl<T: 'static> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Add an observer. Registering the same observer twice is a no-op.
    pub async fn register<O>(&self, observer: &Arc<O>)
    where
        O: Observer<T> + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(observer);
        let target: Weak<dyn Observer<T>> = weak;
        let mut observers = self.observers.write().await;
        if observers.iter().any(|w| same_observer(w, &target)) {
            return;
        }
        observers.push(target);
        metrics::set_observer_count(observers.len());
    }

    /// Remove an observer. Removing a non-member is a no-op.
    pub async fn deregister<O>(&self, observer: &Arc<O>)
    where
        O: Observer<T> + 'static,
    {
        let weak: Weak<O> = Arc::downgrade(observer);
        let target: Weak<dyn Observer<T>> = weak;
        let mut observers = self.observers.write().await;
        observers.retain(|w| !same_observer(w, &target));
        metrics::set_observer_count(observers.len());
    }

    /// Number of registered observers that are still alive
    pub async fn len(&self) -> usize {
        self.observers
            .read()
            .await
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Invoke every live observer once with `data`. Returns the number notified.
    ///
    /// The observer set is snapshotted and the lock released before any
    /// callback runs, so observers may register or deregister from inside
    /// `on_notify`.
    pub async fn notify_all(&self, data: &T) -> usize {
        let live: Vec<Arc<dyn Observer<T>>> = {
            let mut observers = self.observers.write().await;
            observers.retain(|w| w.strong_count() > 0);
            metrics::set_observer_count(observers.len());
            observers.iter().filter_map(Weak::upgrade).collect()
        };

        for observer in &live {
            observer.on_notify(data);
        }

        trace!(observers = live.len(), "Dynconfig observers notified");
        live.len()
    }
}

impl<T: 'static> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_observer<T>(a: &Weak<dyn Observer<T>>, b: &Weak<dyn Observer<T>>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}
