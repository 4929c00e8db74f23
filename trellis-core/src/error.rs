//! Error types for Trellis.
//!
//! The layering engine and the reactive view never fail: dangling
//! references, cycles and self-references are ordinary data. Errors only
//! arise at the edges, when project rows or configuration are loaded.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ProjectId;

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, TrellisError>;

/// Errors raised while loading project data or configuration.
#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read file: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate project id: {id}")]
    DuplicateProject { id: ProjectId },

    #[error("Project id must not be empty")]
    EmptyProjectId,

    #[error("Unknown project: {id}")]
    UnknownProject { id: ProjectId },

    #[error("Invalid layer map: {reason}")]
    InvalidLayerMap { reason: String },
}

impl TrellisError {
    /// Wrap an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_project() {
        let err = TrellisError::DuplicateProject {
            id: ProjectId::from("alpha"),
        };
        assert_eq!(err.to_string(), "Duplicate project id: alpha");

        let err = TrellisError::UnknownProject {
            id: ProjectId::from("ghost"),
        };
        assert_eq!(err.to_string(), "Unknown project: ghost");
    }

    #[test]
    fn io_error_keeps_path_and_source() {
        let err = TrellisError::io(
            "projects.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("projects.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: TrellisError = parse.into();
        assert!(matches!(err, TrellisError::Json(_)));
    }
}
