//! Trellis Core
//!
//! This crate provides the dependency-layering core of the Trellis project
//! dashboard. It implements:
//!
//! - A pure engine that partitions a project's transitive dependencies into
//!   ordered layers by distance
//! - Reactive primitives (signals, memos, subscriptions)
//! - An observable project store with consistent snapshots
//! - Reactive dependency views that keep the layers current
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `model`: Project records as stored by the datasource
//! - `layers`: The layering engine and the `ProjectLookup` abstraction
//! - `reactive`: Signals, memos and subscription handles
//! - `store`: The injected, observable project collection
//! - `view`: `DependencyView`, the memoized layers of one project
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trellis_core::model::Project;
//! use trellis_core::reactive::Signal;
//! use trellis_core::store::ProjectStore;
//! use trellis_core::view::DependencyView;
//!
//! let store = Arc::new(
//!     ProjectStore::from_projects([
//!         Project::new("b").depends_on(["d"]),
//!         Project::new("c").depends_on(["d"]),
//!         Project::new("d"),
//!     ])
//!     .unwrap(),
//! );
//!
//! let root = Signal::new(Project::new("a").depends_on(["b", "c"]));
//! let view = DependencyView::new(root.clone(), store.clone());
//! assert_eq!(view.dependency_layer_map().ids(), vec![vec!["b", "c"], vec!["d"]]);
//!
//! // Changing the root invalidates the view; the next read recomputes.
//! root.update(|p| p.clone().depends_on(["c"]));
//! assert_eq!(view.dependency_layer_map().ids(), vec![vec!["c"], vec!["d"]]);
//! ```

pub mod config;
pub mod error;
pub mod layers;
pub mod model;
pub mod reactive;
pub mod store;
pub mod view;

pub use config::LayerConfig;
pub use error::{Result, TrellisError};
pub use layers::{compute_layers, compute_layers_with, LayerMap, ProjectLookup};
pub use model::{Project, ProjectId};
pub use view::DependencyView;
