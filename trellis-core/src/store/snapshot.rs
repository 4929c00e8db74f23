//! Immutable store snapshots.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::layers::ProjectLookup;
use crate::model::{Project, ProjectId};

/// A consistent, read-only view of a `ProjectStore` at one version.
///
/// Cheap to clone; it shares the underlying map with the store until the
/// store's next write.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    version: u64,
    projects: Arc<IndexMap<ProjectId, Project>>,
}

impl ProjectSnapshot {
    pub(crate) fn new(version: u64, projects: Arc<IndexMap<ProjectId, Project>>) -> Self {
        Self { version, projects }
    }

    /// Store version this snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Project> + '_ {
        self.projects.values()
    }
}

impl ProjectLookup for ProjectSnapshot {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::compute_layers;

    #[test]
    fn snapshot_serves_as_lookup() {
        let projects: IndexMap<ProjectId, Project> = [
            Project::new("b").depends_on(["c"]),
            Project::new("c"),
        ]
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();
        let snapshot = ProjectSnapshot::new(3, Arc::new(projects));

        assert_eq!(snapshot.version(), 3);
        assert_eq!(snapshot.len(), 2);
        let ids: Vec<_> = snapshot.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let root = Project::new("a").depends_on(["b"]);
        let layers = compute_layers(&root, &snapshot);
        assert_eq!(layers.ids(), vec![vec!["b"], vec!["c"]]);
    }
}
