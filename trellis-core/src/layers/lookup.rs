//! Read-only project lookups.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use indexmap::{IndexMap, IndexSet};

use crate::model::{Project, ProjectId};

/// Identifier-keyed read access to projects.
///
/// Implementations must return `None` for unknown ids rather than panic.
/// The engine never mutates a lookup.
pub trait ProjectLookup {
    /// Resolve a project by id.
    fn lookup(&self, id: &str) -> Option<&Project>;
}

impl<L: ProjectLookup + ?Sized> ProjectLookup for &L {
    fn lookup(&self, id: &str) -> Option<&Project> {
        (**self).lookup(id)
    }
}

impl<S: BuildHasher> ProjectLookup for HashMap<ProjectId, Project, S> {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.get(id)
    }
}

impl<S: BuildHasher> ProjectLookup for IndexMap<ProjectId, Project, S> {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.get(id)
    }
}

impl ProjectLookup for BTreeMap<ProjectId, Project> {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.get(id)
    }
}

/// Linear scan. Handy for small fixtures; the first matching id wins.
impl ProjectLookup for [Project] {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.iter().find(|project| project.id.as_str() == id)
    }
}

impl ProjectLookup for Vec<Project> {
    fn lookup(&self, id: &str) -> Option<&Project> {
        self.as_slice().lookup(id)
    }
}

/// A lookup adapter that records every id it was asked to resolve.
///
/// Both resolved and dangling ids are recorded, in first-request order.
/// The reactive view uses the recorded set to decide which store changes
/// can affect a computed `LayerMap`.
pub struct RecordingLookup<'a, L: ?Sized> {
    inner: &'a L,
    requested: RefCell<IndexSet<ProjectId>>,
}

impl<'a, L: ProjectLookup + ?Sized> RecordingLookup<'a, L> {
    pub fn new(inner: &'a L) -> Self {
        Self {
            inner,
            requested: RefCell::new(IndexSet::new()),
        }
    }

    /// Number of distinct ids requested so far.
    pub fn requested_count(&self) -> usize {
        self.requested.borrow().len()
    }

    /// Consume the adapter and return the requested ids.
    pub fn into_requested(self) -> IndexSet<ProjectId> {
        self.requested.into_inner()
    }
}

impl<L: ProjectLookup + ?Sized> ProjectLookup for RecordingLookup<'_, L> {
    fn lookup(&self, id: &str) -> Option<&Project> {
        {
            let mut requested = self.requested.borrow_mut();
            if !requested.contains(id) {
                requested.insert(ProjectId::from(id));
            }
        }
        self.inner.lookup(id)
    }
}
