//! Dependency Layers
//!
//! This module partitions the projects reachable from a root project into
//! ordered layers by dependency distance.
//!
//! # Overview
//!
//! Given a root and a read-only `ProjectLookup`, the engine walks the
//! `dependsOnProjects` edges breadth-first, one layer at a time:
//!
//! - Layer 1 holds the root's direct dependencies.
//! - Layer N+1 holds the dependencies of layer N that were never seen before.
//!
//! A single visited set, seeded with the root, makes the walk terminate on
//! cyclic data and guarantees that every project lands in exactly one layer
//! (the first one at which it is discovered).
//!
//! # Data Quirks
//!
//! Operational data is messy and none of the following is an error:
//!
//! - Dangling ids (no entry in the lookup) are skipped.
//! - Duplicate ids keep their first position only.
//! - Cycles, including a root that lists itself, never route back to a
//!   project that was already discovered.
//!
//! An id counts as visited the moment it is discovered, even if it did not
//! resolve at that moment.

mod engine;
mod layer_map;
mod lookup;

pub use engine::{compute_layers, compute_layers_with};
pub use layer_map::LayerMap;
pub use lookup::{ProjectLookup, RecordingLookup};
