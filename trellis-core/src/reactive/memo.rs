//! Memo Implementation
//!
//! A Memo is a cached derived value that re-evaluates only when it has been
//! invalidated since its last computation.
//!
//! # How Memos Work
//!
//! 1. Every memo carries an epoch counter. Invalidation bumps the epoch and
//!    does nothing else.
//!
//! 2. The cached value remembers the epoch it was computed in.
//!
//! 3. On access, if the cached epoch matches the current epoch the cache is
//!    returned; otherwise the computation runs and the cache is replaced.
//!
//! # Why This Matters
//!
//! Recomputation is pull-based:
//!
//! - A store write may invalidate many memos
//! - Only the memos actually read will recompute
//! - Memos that are never read stay stale (no wasted work)
//!
//! # Thread Safety
//!
//! The computation runs with the cache mutex held, so concurrent readers in
//! the same epoch wait for and share a single computation. A computation must
//! therefore never read the memo it belongs to.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use super::subscriber::{Notifier, SubscriberId, Subscription};

/// Sentinel for "no clean epoch yet".
const NO_EPOCH: u64 = u64::MAX;

/// Cache state of a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoState {
    /// Never computed.
    Uncomputed,

    /// The cached value is up-to-date.
    Clean,

    /// Invalidated since the last computation. The next read recomputes.
    Stale,
}

/// A trait for types that can be told their inputs changed.
pub trait Reactive: Send + Sync {
    /// Mark this reactive value as needing recomputation.
    fn invalidate(&self);
}

/// Weak invalidation handle for a memo.
///
/// Subscribing a memo to its inputs through an `Invalidator` avoids a
/// reference cycle between the memo and the sources it watches.
#[derive(Clone)]
pub struct Invalidator {
    target: Weak<dyn Reactive>,
}

impl Invalidator {
    /// Invalidate the target. Returns `false` if it no longer exists.
    pub fn invalidate(&self) -> bool {
        match self.target.upgrade() {
            Some(target) => {
                target.invalidate();
                true
            }
            None => false,
        }
    }
}

impl Debug for Invalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invalidator")
            .field("alive", &(self.target.strong_count() > 0))
            .finish()
    }
}

struct Cached<T> {
    value: T,
    epoch: u64,
}

struct MemoInner<T> {
    subscriber_id: SubscriberId,

    compute: Box<dyn Fn() -> T + Send + Sync>,

    /// Bumped by every invalidation.
    epoch: AtomicU64,

    /// Epoch the cached value belongs to, or `NO_EPOCH`.
    clean_epoch: AtomicU64,

    cache: Mutex<Option<Cached<T>>>,

    recomputations: AtomicU64,

    /// Told when the memo goes from clean to stale.
    notifier: Notifier<()>,
}

impl<T> Reactive for MemoInner<T>
where
    T: Send + Sync,
{
    fn invalidate(&self) {
        let previous = self.epoch.fetch_add(1, Ordering::SeqCst);
        if self.clean_epoch.load(Ordering::SeqCst) == previous {
            trace!(memo = self.subscriber_id.raw(), epoch = previous + 1, "memo went stale");
            self.notifier.notify(&());
        }
    }
}

/// A cached derived value that recomputes only after invalidation.
///
/// # Type Parameters
///
/// - `T`: The type of the computed value. Must be Clone + Send + Sync + PartialEq.
///
/// The PartialEq bound lets a recomputation report whether the value
/// actually changed.
///
/// # Example
///
/// ```rust
/// use trellis_core::reactive::{Memo, MemoState};
///
/// let memo = Memo::new(|| 21 * 2);
/// assert_eq!(memo.state(), MemoState::Uncomputed);
/// assert_eq!(memo.get(), 42);
///
/// memo.invalidate();
/// assert_eq!(memo.state(), MemoState::Stale);
/// assert_eq!(memo.get(), 42);
/// assert_eq!(memo.recompute_count(), 2);
/// ```
pub struct Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    inner: Arc<MemoInner<T>>,
}

impl<T> Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    /// Create a new memo with the given computation function.
    ///
    /// The computation is not run immediately. It runs on first access.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(MemoInner {
                subscriber_id: SubscriberId::new(),
                compute: Box::new(compute),
                epoch: AtomicU64::new(0),
                clean_epoch: AtomicU64::new(NO_EPOCH),
                cache: Mutex::new(None),
                recomputations: AtomicU64::new(0),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Get the subscriber ID for this memo.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.inner.subscriber_id
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        let inner = &*self.inner;
        let mut cache = inner.cache.lock();
        let epoch = inner.epoch.load(Ordering::SeqCst);

        if let Some(cached) = cache.as_ref() {
            if cached.epoch == epoch {
                return cached.value.clone();
            }
        }

        let value = (inner.compute)();
        let changed = cache.as_ref().map_or(true, |cached| cached.value != value);
        let count = inner.recomputations.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(memo = inner.subscriber_id.raw(), epoch, changed, count, "memo recomputed");

        *cache = Some(Cached {
            value: value.clone(),
            epoch,
        });
        inner.clean_epoch.store(epoch, Ordering::SeqCst);
        drop(cache);

        // Invalidated while computing: the value we hand out is already stale.
        if inner.epoch.load(Ordering::SeqCst) != epoch {
            inner.notifier.notify(&());
        }

        value
    }

    /// Mark the memo as needing recomputation.
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// A weak handle that invalidates this memo while it is alive.
    pub fn invalidator(&self) -> Invalidator {
        let target: Weak<dyn Reactive> = Arc::downgrade(&self.inner) as Weak<dyn Reactive>;
        Invalidator { target }
    }

    /// Register a callback invoked when the memo goes from clean to stale.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.notifier.subscribe(move |_| notify())
    }

    /// Get the current cache state.
    pub fn state(&self) -> MemoState {
        match self.inner.clean_epoch.load(Ordering::SeqCst) {
            NO_EPOCH => MemoState::Uncomputed,
            clean if clean == self.inner.epoch.load(Ordering::SeqCst) => MemoState::Clean,
            _ => MemoState::Stale,
        }
    }

    /// Check if the memo has a cached value.
    pub fn has_value(&self) -> bool {
        self.inner.clean_epoch.load(Ordering::SeqCst) != NO_EPOCH
    }

    /// Number of times the computation has run.
    pub fn recompute_count(&self) -> u64 {
        self.inner.recomputations.load(Ordering::SeqCst)
    }
}

impl<T> Clone for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Clone + Send + Sync + PartialEq + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("id", &self.inner.subscriber_id)
            .field("state", &self.state())
            .field("recomputations", &self.recompute_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
