//! Project records.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a project.
///
/// Ids are opaque strings assigned by the datasource. A dependency list may
/// name ids that do not (yet) exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<str> for ProjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tracked project and the projects it depends on.
///
/// `depends_on_projects` is kept exactly as stored: it may contain
/// duplicates, dangling ids, or the project's own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,

    /// Display name. Rows without a name deserialize to an empty string.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub depends_on_projects: Vec<ProjectId>,
}

impl Project {
    /// Create a project with no name and no dependencies.
    pub fn new(id: impl Into<ProjectId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            depends_on_projects: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the dependency list.
    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ProjectId>,
    {
        self.depends_on_projects = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this project lists `id` among its dependencies.
    pub fn depends_directly_on(&self, id: &str) -> bool {
        self.depends_on_projects.iter().any(|dep| dep.as_str() == id)
    }
}
