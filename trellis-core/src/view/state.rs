//! Serializable view state.

use serde::{Deserialize, Serialize};

use crate::layers::LayerMap;
use crate::model::Project;

/// A project together with its dependency layers.
///
/// Serializes as `{ "project": ..., "dependencyLayerMap": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyViewState {
    pub project: Project,
    pub dependency_layer_map: LayerMap,
}
