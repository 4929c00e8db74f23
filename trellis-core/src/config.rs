//! Layering configuration.
//!
//! Configuration is plain data: a `LayerConfig` can be built in code,
//! deserialized from JSON, or loaded from a file. Every field has a default
//! that reproduces the unbounded layering behaviour.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrellisError};

/// Options controlling how layers are computed.
///
/// # Example
///
/// ```rust
/// use trellis_core::config::LayerConfig;
///
/// let config = LayerConfig::from_json(r#"{ "maxLayers": 3 }"#).unwrap();
/// assert_eq!(config.max_layers.map(|n| n.get()), Some(3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerConfig {
    /// Stop after this many layers. `None` expands until the frontier is empty.
    pub max_layers: Option<NonZeroUsize>,
}

impl LayerConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| TrellisError::io(path, e))?;
        Self::from_json(&raw)
    }

    /// Return a copy limited to `max_layers` layers.
    pub fn with_max_layers(mut self, max_layers: NonZeroUsize) -> Self {
        self.max_layers = Some(max_layers);
        self
    }

    /// Whether a layer with the given 1-based index may be emitted.
    pub(crate) fn allows_layer(&self, index: usize) -> bool {
        self.max_layers.map_or(true, |max| index <= max.get())
    }
}
