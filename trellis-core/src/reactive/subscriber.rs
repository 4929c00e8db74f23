//! Subscriber bookkeeping for the reactive system.
//!
//! Every reactive value that can change (signals, memos, the project store)
//! owns a `Notifier`. Interested parties register a callback and receive a
//! `Subscription`; dropping the subscription removes the callback.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Unique identifier for a subscriber.
///
/// Each subscription, memo or view gets a unique ID when created. The ID
/// is used to remove exactly the right callback on unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a registered callback.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) removes
/// the callback. Release happens at most once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriberId,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<F>(id: SubscriberId, release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the callback now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.release.is_some())
            .finish()
    }
}

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;
type Callbacks<E> = RwLock<IndexMap<SubscriberId, Callback<E>>>;

/// Registry of callbacks interested in events of type `E`.
///
/// Callbacks run in registration order, outside of the registry lock, so a
/// callback may itself subscribe, unsubscribe, or read reactive values.
/// Clones share the same registry.
pub struct Notifier<E> {
    callbacks: Arc<Callbacks<E>>,
}

impl<E: 'static> Notifier<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Register a callback. It stays registered while the returned
    /// subscription is alive.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriberId::new();
        self.callbacks.write().insert(id, Arc::new(callback));

        // Weak so an outstanding subscription does not keep the registry alive.
        let registry: Weak<Callbacks<E>> = Arc::downgrade(&self.callbacks);
        Subscription::new(id, move || {
            if let Some(callbacks) = registry.upgrade() {
                callbacks.write().shift_remove(&id);
            }
        })
    }

    /// Invoke every registered callback with `event`.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Arc::clone(&self.callbacks),
        }
    }
}

impl<E> fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.callbacks.read().len())
            .finish()
    }
}
