//! Layer-synchronous breadth-first expansion.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::layer_map::LayerMap;
use super::lookup::ProjectLookup;
use crate::config::LayerConfig;
use crate::model::{Project, ProjectId};

/// Partition every project reachable from `root` into dependency layers.
///
/// Pure: reads `root` and `lookup`, allocates a new `LayerMap`.
///
/// # Example
///
/// ```rust
/// use trellis_core::layers::compute_layers;
/// use trellis_core::model::Project;
///
/// let projects = vec![
///     Project::new("b").depends_on(["d"]),
///     Project::new("c").depends_on(["d"]),
///     Project::new("d"),
/// ];
/// let root = Project::new("a").depends_on(["b", "c"]);
///
/// let layers = compute_layers(&root, &projects);
/// assert_eq!(layers.ids(), vec![vec!["b", "c"], vec!["d"]]);
/// ```
pub fn compute_layers<L>(root: &Project, lookup: &L) -> LayerMap
where
    L: ProjectLookup + ?Sized,
{
    compute_layers_with(root, lookup, &LayerConfig::default())
}

/// Like [`compute_layers`], but honours `config.max_layers`.
pub fn compute_layers_with<L>(root: &Project, lookup: &L, config: &LayerConfig) -> LayerMap
where
    L: ProjectLookup + ?Sized,
{
    let mut layers = LayerMap::new();

    // The root is visited up front so a cycle can never place it in a layer.
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(root.id.as_str());

    let mut frontier = discover(&root.depends_on_projects, lookup, &mut visited);

    while !frontier.is_empty() {
        let index = layers.layer_count() + 1;
        if !config.allows_layer(index) {
            trace!(root = %root.id, index, "layer limit reached");
            break;
        }

        let next = discover(
            frontier.iter().copied().flat_map(|p| &p.depends_on_projects),
            lookup,
            &mut visited,
        );

        trace!(index, size = frontier.len(), "placed layer");
        layers.push_layer(frontier.into_iter().cloned().collect());
        frontier = next;
    }

    debug!(
        root = %root.id,
        layers = layers.layer_count(),
        projects = layers.project_count(),
        visited = visited.len(),
        "computed dependency layers"
    );

    layers
}

/// Resolve the not-yet-visited candidates, in order.
///
/// Every candidate is marked visited on discovery, whether or not it
/// resolves, so an id is attempted at most once per computation.
fn discover<'a, I, L>(candidates: I, lookup: &'a L, visited: &mut HashSet<&'a str>) -> Vec<&'a Project>
where
    I: IntoIterator<Item = &'a ProjectId>,
    L: ProjectLookup + ?Sized,
{
    candidates
        .into_iter()
        .filter(|&id| visited.insert(id.as_str()))
        .filter_map(|id| lookup.lookup(id.as_str()))
        .collect()
}
