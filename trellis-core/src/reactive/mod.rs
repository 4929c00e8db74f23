//! Reactive Primitives
//!
//! This module implements the small reactive system the dependency views
//! are built on: signals, memos, and subscriptions.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state with a version counter. Every
//! write bumps the version and notifies subscribers.
//!
//! ## Memos
//!
//! A Memo is a derived value that caches its result. Invalidation only bumps
//! an epoch; the computation re-runs on the next read. All readers within one
//! epoch share one computation.
//!
//! ## Subscriptions
//!
//! Subscribing returns a `Subscription` handle. Dropping the handle removes
//! the callback, so an owner releases everything it listens to simply by
//! dropping its handles.
//!
//! # Implementation Notes
//!
//! Dependencies are wired explicitly: the owner of a memo subscribes to the
//! sources it reads and forwards changes through a weak `Invalidator`.
//! There is no global runtime and no thread-local tracking context.

mod memo;
mod signal;
mod subscriber;

pub use memo::{Invalidator, Memo, MemoState, Reactive};
pub use signal::Signal;
pub use subscriber::{Notifier, SubscriberId, Subscription};
