//! Layer map produced by the engine.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TrellisError;
use crate::model::Project;

/// Ordered mapping from 1-based layer index to the projects in that layer.
///
/// Invariants maintained by the engine:
///
/// - Indices are contiguous starting at 1.
/// - No layer is empty.
/// - A project id appears in at most one layer, and never the root's id.
///
/// Serializes as a JSON object keyed by layer index (`{"1": [...]}`).
/// Deserializing checks the first three invariants and rejects any map
/// that breaks them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerMap {
    layers: IndexMap<usize, Vec<Project>>,
}

impl LayerMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next layer. Empty layers are never stored.
    pub(crate) fn push_layer(&mut self, projects: Vec<Project>) {
        debug_assert!(!projects.is_empty(), "layers must not be empty");
        let index = self.layers.len() + 1;
        self.layers.insert(index, projects);
    }

    /// Projects in the layer with the given 1-based index.
    pub fn layer(&self, index: usize) -> Option<&[Project]> {
        self.layers.get(&index).map(Vec::as_slice)
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of projects across all layers.
    pub fn project_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Iterate layers in order as `(index, projects)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Project])> + '_ {
        self.layers.iter().map(|(index, projects)| (*index, projects.as_slice()))
    }

    /// The layer index holding `id`, i.e. its dependency distance from the root.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.iter()
            .find(|(_, projects)| projects.iter().any(|p| p.id.as_str() == id))
            .map(|(index, _)| index)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.depth_of(id).is_some()
    }

    /// Project ids per layer, in layer order.
    pub fn ids(&self) -> Vec<Vec<&str>> {
        self.layers
            .values()
            .map(|projects| projects.iter().map(|p| p.id.as_str()).collect())
            .collect()
    }
}

impl TryFrom<IndexMap<usize, Vec<Project>>> for LayerMap {
    type Error = TrellisError;

    fn try_from(layers: IndexMap<usize, Vec<Project>>) -> Result<Self, Self::Error> {
        let invalid = |reason: String| TrellisError::InvalidLayerMap { reason };

        let mut seen = HashSet::new();
        for (position, (index, projects)) in layers.iter().enumerate() {
            if *index != position + 1 {
                return Err(invalid(format!(
                    "expected layer {} but found layer {index}",
                    position + 1
                )));
            }
            if projects.is_empty() {
                return Err(invalid(format!("layer {index} is empty")));
            }
            for project in projects {
                if !seen.insert(project.id.as_str()) {
                    return Err(invalid(format!(
                        "project {} appears in more than one place",
                        project.id
                    )));
                }
            }
        }

        Ok(Self { layers })
    }
}

impl<'de> Deserialize<'de> for LayerMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let layers = IndexMap::<usize, Vec<Project>>::deserialize(deserializer)?;
        LayerMap::try_from(layers).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for LayerMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, (index, projects)) in self.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            write!(f, "Layer {index}:")?;
            for (i, project) in projects.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{sep}{}", project.id)?;
            }
        }
        Ok(())
    }
}
