//! Dependency Views
//!
//! A `DependencyView` keeps the dependency layers of one project up to date
//! without the consumer re-running the computation.
//!
//! # How It Works
//!
//! 1. The layers live in a `Memo<LayerMap>`. Its computation reads the root
//!    project from a `Signal`, takes a store snapshot, and runs the engine
//!    through a `RecordingLookup`.
//!
//! 2. The ids the engine tried to resolve (resolved or dangling) become the
//!    view's tracked inputs.
//!
//! 3. The view subscribes to the root signal and to the store:
//!    a. Any root write invalidates the memo.
//!    b. A store change invalidates the memo if it touches a tracked id, or
//!       if it lands while a computation is running.
//!
//! 4. Invalidation is cheap; the layers are recomputed on the next read.
//!
//! Dropping the view (or calling `dispose`) releases both subscriptions.

mod state;

pub use state::DependencyViewState;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::LayerConfig;
use crate::error::{Result, TrellisError};
use crate::layers::{compute_layers_with, LayerMap, RecordingLookup};
use crate::model::{Project, ProjectId};
use crate::reactive::{Memo, MemoState, Signal, Subscription};
use crate::store::{ProjectStore, StoreChange};

/// Inputs observed by the most recent computation.
#[derive(Default)]
struct TrackedInputs {
    ids: RwLock<HashSet<ProjectId>>,
    computing: AtomicBool,
}

impl TrackedInputs {
    fn affected_by(&self, change: &StoreChange) -> bool {
        if self.computing.load(Ordering::SeqCst) {
            return true;
        }
        let ids = self.ids.read();
        change.ids.iter().any(|id| ids.contains(id))
    }
}

/// Reactive dependency layers of one project.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use trellis_core::model::Project;
/// use trellis_core::reactive::Signal;
/// use trellis_core::store::ProjectStore;
/// use trellis_core::view::DependencyView;
///
/// let store = Arc::new(ProjectStore::from_projects([Project::new("b")]).unwrap());
/// let root = Signal::new(Project::new("a").depends_on(["b", "c"]));
/// let view = DependencyView::new(root, store.clone());
///
/// assert_eq!(view.dependency_layer_map().ids(), vec![vec!["b"]]);
///
/// // "c" was dangling; once it appears the view picks it up.
/// store.upsert(Project::new("c"));
/// assert_eq!(view.dependency_layer_map().ids(), vec![vec!["b", "c"]]);
/// ```
pub struct DependencyView {
    project: Signal<Project>,
    store: Arc<ProjectStore>,
    config: LayerConfig,
    layers: Memo<LayerMap>,
    inputs: Arc<TrackedInputs>,
    subscriptions: Mutex<Vec<Subscription>>,
    disposed: AtomicBool,
}

impl DependencyView {
    /// Create a view over `project` backed by `store`.
    pub fn new(project: Signal<Project>, store: Arc<ProjectStore>) -> Self {
        Self::with_config(project, store, LayerConfig::default())
    }

    /// Create a view with explicit layering options.
    pub fn with_config(project: Signal<Project>, store: Arc<ProjectStore>, config: LayerConfig) -> Self {
        let inputs = Arc::new(TrackedInputs::default());
        let layers = Self::layers_memo(project.clone(), Arc::clone(&store), Arc::clone(&inputs), config);

        let invalidator = layers.invalidator();
        let on_project = {
            let invalidator = invalidator.clone();
            project.subscribe(move || {
                trace!("root project changed");
                invalidator.invalidate();
            })
        };
        let on_store = {
            let inputs = Arc::clone(&inputs);
            store.subscribe(move |change| {
                if inputs.affected_by(change) {
                    trace!(version = change.version, "store change reached tracked projects");
                    invalidator.invalidate();
                }
            })
        };

        Self {
            project,
            store,
            config,
            layers,
            inputs,
            subscriptions: Mutex::new(vec![on_project, on_store]),
            disposed: AtomicBool::new(false),
        }
    }

    /// Create a view bound to the stored record `id`.
    ///
    /// Writes to that record in the store flow into the view's root. If the
    /// record is removed, the view keeps its last known root.
    pub fn bind(store: Arc<ProjectStore>, id: &str, config: LayerConfig) -> Result<Self> {
        let project = store.get(id).ok_or_else(|| TrellisError::UnknownProject {
            id: ProjectId::from(id),
        })?;
        let root = Signal::new(project);

        let follow = {
            let root = root.clone();
            let id = ProjectId::from(id);
            let source = Arc::downgrade(&store);
            store.subscribe(move |change| {
                if !change.touches(id.as_str()) {
                    return;
                }
                if let Some(updated) = source.upgrade().and_then(|store| store.get(id.as_str())) {
                    root.set(updated);
                }
            })
        };

        let view = Self::with_config(root, store, config);
        view.subscriptions.lock().push(follow);
        Ok(view)
    }

    fn layers_memo(
        project: Signal<Project>,
        store: Arc<ProjectStore>,
        inputs: Arc<TrackedInputs>,
        config: LayerConfig,
    ) -> Memo<LayerMap> {
        Memo::new(move || {
            inputs.computing.store(true, Ordering::SeqCst);

            let root = project.get();
            let snapshot = store.snapshot();
            let recording = RecordingLookup::new(&snapshot);
            let layers = compute_layers_with(&root, &recording, &config);

            let requested: HashSet<ProjectId> = recording.into_requested().into_iter().collect();
            debug!(
                root = %root.id,
                store_version = snapshot.version(),
                tracked = requested.len(),
                "dependency view recomputed"
            );
            *inputs.ids.write() = requested;
            inputs.computing.store(false, Ordering::SeqCst);

            layers
        })
    }

    /// The current root project.
    pub fn project(&self) -> Project {
        self.project.get()
    }

    /// The signal holding the root project.
    pub fn project_signal(&self) -> &Signal<Project> {
        &self.project
    }

    /// The store this view reads from.
    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// The dependency layers of the current root, recomputed only if stale.
    pub fn dependency_layer_map(&self) -> LayerMap {
        self.layers.get()
    }

    /// Root and layers together, as consumed by presentation code.
    pub fn state(&self) -> DependencyViewState {
        DependencyViewState {
            project: self.project(),
            dependency_layer_map: self.dependency_layer_map(),
        }
    }

    /// Cache state of the layers.
    pub fn memo_state(&self) -> MemoState {
        self.layers.state()
    }

    /// Number of layer computations so far.
    pub fn recompute_count(&self) -> u64 {
        self.layers.recompute_count()
    }

    /// Ids the last computation attempted to resolve.
    pub fn tracked_ids(&self) -> Vec<ProjectId> {
        let mut ids: Vec<_> = self.inputs.ids.read().iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Register a callback invoked when the layers become stale.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.layers.subscribe(notify)
    }

    /// Stop reacting to the root signal and the store.
    ///
    /// Reads keep working and return the last computed layers. Calling
    /// `dispose` more than once is a no-op.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let released = std::mem::take(&mut *self.subscriptions.lock());
        debug!(released = released.len(), "dependency view disposed");
        drop(released);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for DependencyView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyView")
            .field("project", &self.project.with(|p| p.id.clone()))
            .field("state", &self.memo_state())
            .field("recomputations", &self.recompute_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI32;

    fn diamond_store() -> Arc<ProjectStore> {
        Arc::new(
            ProjectStore::from_projects([
                Project::new("a").depends_on(["b", "c"]),
                Project::new("b").depends_on(["d"]),
                Project::new("c").depends_on(["d"]),
                Project::new("d"),
                Project::new("unrelated").depends_on(["z"]),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn computes_lazily_and_caches() {
        let store = diamond_store();
        let root = Signal::new(store.get("a").unwrap());
        let view = DependencyView::new(root, store);

        assert_eq!(view.memo_state(), MemoState::Uncomputed);
        assert_eq!(view.recompute_count(), 0);

        assert_eq!(view.dependency_layer_map().ids(), vec![vec!["b", "c"], vec!["d"]]);
        view.dependency_layer_map();
        assert_eq!(view.recompute_count(), 1);
    }

    #[test]
    fn root_write_invalidates() {
        let store = diamond_store();
        let root = Signal::new(store.get("a").unwrap());
        let view = DependencyView::new(root.clone(), store);
        view.dependency_layer_map();

        root.update(|p| p.clone().depends_on(["d"]));
        assert_eq!(view.memo_state(), MemoState::Stale);
        assert_eq!(view.dependency_layer_map().ids(), vec![vec!["d"]]);
        assert_eq!(view.recompute_count(), 2);
    }

    #[test]
    fn reachable_project_change_invalidates() {
        let store = diamond_store();
        let view = DependencyView::new(Signal::new(store.get("a").unwrap()), store.clone());
        view.dependency_layer_map();

        store.upsert(Project::new("d").depends_on(["e"]));
        store.upsert(Project::new("e"));

        assert_eq!(
            view.dependency_layer_map().ids(),
            vec![vec!["b", "c"], vec!["d"], vec!["e"]]
        );
    }

    #[test]
    fn unrelated_change_keeps_cache() {
        let store = diamond_store();
        let view = DependencyView::new(Signal::new(store.get("a").unwrap()), store.clone());
        view.dependency_layer_map();

        store.upsert(Project::new("unrelated"));
        store.upsert(Project::new("z"));

        assert_eq!(view.memo_state(), MemoState::Clean);
        view.dependency_layer_map();
        assert_eq!(view.recompute_count(), 1);
    }

    #[test]
    fn tracked_ids_include_dangling_references() {
        let store = Arc::new(ProjectStore::from_projects([Project::new("b")]).unwrap());
        let view = DependencyView::new(
            Signal::new(Project::new("a").depends_on(["b", "ghost"])),
            store,
        );
        view.dependency_layer_map();

        assert_eq!(
            view.tracked_ids(),
            vec![ProjectId::from("b"), ProjectId::from("ghost")]
        );
    }

    #[test]
    fn subscribers_hear_staleness_once() {
        let store = diamond_store();
        let view = DependencyView::new(Signal::new(store.get("a").unwrap()), store.clone());
        let heard = Arc::new(AtomicI32::new(0));
        let heard_clone = heard.clone();
        let _sub = view.subscribe(move || {
            heard_clone.fetch_add(1, Ordering::SeqCst);
        });

        view.dependency_layer_map();
        store.upsert(Project::new("b"));
        store.upsert(Project::new("c"));
        assert_eq!(heard.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_releases_subscriptions() {
        let store = diamond_store();
        let root = Signal::new(store.get("a").unwrap());
        let view = DependencyView::new(root.clone(), store.clone());
        view.dependency_layer_map();

        assert_eq!(root.subscriber_count(), 1);
        assert_eq!(store.subscriber_count(), 1);

        view.dispose();
        view.dispose();
        assert!(view.is_disposed());
        assert_eq!(root.subscriber_count(), 0);
        assert_eq!(store.subscriber_count(), 0);

        root.set(Project::new("a"));
        assert_eq!(view.memo_state(), MemoState::Clean);
        assert_eq!(view.dependency_layer_map().ids(), vec![vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn dropping_view_releases_subscriptions() {
        let store = diamond_store();
        let root = Signal::new(store.get("a").unwrap());
        {
            let _view = DependencyView::bind(store.clone(), "a", LayerConfig::default()).unwrap();
            let _other = DependencyView::new(root.clone(), store.clone());
            assert_eq!(store.subscriber_count(), 3);
        }
        assert_eq!(store.subscriber_count(), 0);
        assert_eq!(root.subscriber_count(), 0);
    }

    #[test]
    fn bound_view_follows_stored_root() {
        let store = diamond_store();
        let view = DependencyView::bind(store.clone(), "a", LayerConfig::default()).unwrap();
        assert_eq!(view.dependency_layer_map().layer_count(), 2);

        store.upsert(Project::new("a").depends_on(["c"]));
        assert_eq!(view.project().depends_on_projects, vec![ProjectId::from("c")]);
        assert_eq!(view.dependency_layer_map().ids(), vec![vec!["c"], vec!["d"]]);

        store.remove("a");
        assert_eq!(view.project().id.as_str(), "a");
    }

    #[test]
    fn bind_rejects_unknown_project() {
        let err = DependencyView::bind(diamond_store(), "nope", LayerConfig::default()).unwrap_err();
        assert!(matches!(err, TrellisError::UnknownProject { .. }));
    }

    #[test]
    fn state_pairs_project_and_layers() {
        let store = diamond_store();
        let view = DependencyView::new(Signal::new(store.get("b").unwrap()), store);
        let state = view.state();
        assert_eq!(state.project.id.as_str(), "b");
        assert_eq!(state.dependency_layer_map.ids(), vec![vec!["d"]]);
    }
}
