//! Project Store
//!
//! An observable, in-memory collection of projects. It plays the role of
//! the datasource: a sync layer writes into it, views read from it.
//!
//! # Snapshots
//!
//! The collection is kept behind an `Arc` and written copy-on-write. A
//! `ProjectSnapshot` is that `Arc`, taken under a read lock, so a layer
//! computation always sees one consistent version of the data even if
//! writers keep going.
//!
//! # Notifications
//!
//! Every effective write bumps the store version and emits one
//! `StoreChange` listing the ids that were written or removed. Writes that
//! leave a project unchanged emit nothing.

mod snapshot;

pub use snapshot::ProjectSnapshot;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Result, TrellisError};
use crate::model::{Project, ProjectId};
use crate::reactive::{Notifier, Subscription};

/// Description of one effective store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Store version after the write.
    pub version: u64,

    /// Ids inserted, updated or removed, in write order.
    pub ids: Vec<ProjectId>,
}

impl StoreChange {
    /// Whether the change concerns `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.ids.iter().any(|changed| changed.as_str() == id)
    }
}

/// Observable project collection.
pub struct ProjectStore {
    projects: RwLock<Arc<IndexMap<ProjectId, Project>>>,
    version: AtomicU64,
    notifier: Notifier<StoreChange>,
}

impl ProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(Arc::new(IndexMap::new())),
            version: AtomicU64::new(0),
            notifier: Notifier::new(),
        }
    }

    /// Create a store from project rows.
    ///
    /// Fails on an empty id or on two rows sharing an id.
    pub fn from_projects<I>(projects: I) -> Result<Self>
    where
        I: IntoIterator<Item = Project>,
    {
        let mut map = IndexMap::new();
        for project in projects {
            if project.id.is_empty() {
                return Err(TrellisError::EmptyProjectId);
            }
            if map.contains_key(&project.id) {
                return Err(TrellisError::DuplicateProject { id: project.id });
            }
            map.insert(project.id.clone(), project);
        }

        debug!(projects = map.len(), "project store loaded");
        Ok(Self {
            projects: RwLock::new(Arc::new(map)),
            version: AtomicU64::new(0),
            notifier: Notifier::new(),
        })
    }

    /// Create a store from a JSON array of project rows.
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Project> = serde_json::from_str(json)?;
        Self::from_projects(rows)
    }

    /// Create a store from a JSON file holding an array of project rows.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| TrellisError::io(path, e))?;
        Self::from_json(&raw)
    }

    /// Insert or replace a project.
    ///
    /// Returns `false`, without notifying, when the stored project is
    /// already identical or the project has an empty id. Empty ids are
    /// never stored.
    pub fn upsert(&self, project: Project) -> bool {
        if project.id.is_empty() {
            warn!(name = %project.name, "skipping project with empty id");
            return false;
        }
        let id = project.id.clone();
        let version = {
            let mut projects = self.projects.write();
            if projects.get(&id) == Some(&project) {
                return false;
            }
            Arc::make_mut(&mut *projects).insert(id.clone(), project);
            self.version.fetch_add(1, Ordering::SeqCst) + 1
        };

        debug!(version, id = %id, "project upserted");
        self.notifier.notify(&StoreChange {
            version,
            ids: vec![id],
        });
        true
    }

    /// Insert or replace several projects with a single notification.
    ///
    /// Returns the number of projects that actually changed. Rows with an
    /// empty id are skipped.
    pub fn upsert_many<I>(&self, projects: I) -> usize
    where
        I: IntoIterator<Item = Project>,
    {
        let mut ids = Vec::new();
        let version = {
            let mut guard = self.projects.write();
            for project in projects {
                if project.id.is_empty() {
                    warn!(name = %project.name, "skipping project with empty id");
                    continue;
                }
                if guard.get(&project.id) == Some(&project) {
                    continue;
                }
                ids.push(project.id.clone());
                Arc::make_mut(&mut *guard).insert(project.id.clone(), project);
            }
            if ids.is_empty() {
                return 0;
            }
            self.version.fetch_add(1, Ordering::SeqCst) + 1
        };

        let changed = ids.len();
        debug!(version, changed, "projects upserted");
        self.notifier.notify(&StoreChange { version, ids });
        changed
    }

    /// Remove a project, returning it if it existed.
    pub fn remove(&self, id: &str) -> Option<Project> {
        let (removed, version) = {
            let mut projects = self.projects.write();
            if !projects.contains_key(id) {
                return None;
            }
            let removed = Arc::make_mut(&mut *projects).shift_remove(id)?;
            (removed, self.version.fetch_add(1, Ordering::SeqCst) + 1)
        };

        debug!(version, id = %removed.id, "project removed");
        self.notifier.notify(&StoreChange {
            version,
            ids: vec![removed.id.clone()],
        });
        Some(removed)
    }

    /// Get a copy of a project.
    pub fn get(&self, id: &str) -> Option<Project> {
        self.projects.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.projects.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }

    /// Number of effective writes since creation.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// An immutable view of the current contents.
    pub fn snapshot(&self) -> ProjectSnapshot {
        let projects = self.projects.read();
        ProjectSnapshot::new(self.version(), Arc::clone(&projects))
    }

    /// Register a callback invoked after every effective write.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreChange) + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.notifier.len()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.len())
            .field("version", &self.version())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
