//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value, counts
//! how many times it has been written, and tells subscribers about writes.
//!
//! # How Signals Work
//!
//! 1. Reading a signal returns a clone of its value. Reads never notify.
//!
//! 2. Writing a signal bumps its version and then notifies subscribers,
//!    after the value lock has been released.
//!
//! 3. Subscribers (typically memos) mark themselves stale and recompute on
//!    their next read.
//!
//! # Thread Safety
//!
//! The value is protected by a `parking_lot::RwLock`; clones share the same
//! value, version and subscribers.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::subscriber::{Notifier, Subscription};

/// A mutable, observable value.
///
/// # Example
///
/// ```rust
/// use trellis_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// assert_eq!(count.get(), 0);
///
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// assert_eq!(count.version(), 1);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Arc<RwLock<T>>,

    /// Number of writes so far.
    version: Arc<AtomicU64>,

    notifier: Notifier<()>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            version: Arc::new(AtomicU64::new(0)),
            notifier: Notifier::new(),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Read the current value by reference, without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.version.fetch_add(1, Ordering::SeqCst);
        self.notifier.notify(&());
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let new_value = f(&self.value.read());
        self.set(new_value);
    }

    /// Number of writes since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Register a callback invoked after every write.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(move |_| notify())
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.len()
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            version: Arc::clone(&self.version),
            notifier: self.notifier.clone(),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.value.read())
            .field("version", &self.version())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
