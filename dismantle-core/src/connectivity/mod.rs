//! Connected-component view of the current graph state.
//!
//! Components are recomputed from scratch on every call: a disjoint-set forest
//! is rebuilt over the remaining edges, so the result is a pure function of
//! the graph.

pub(crate) mod union_find;

use std::fmt;

use crate::graph::{DynamicId, Graph};

use self::union_find::DisjointSet;

/// Identifier of a connected component within one [`Components`] snapshot.
///
/// Ids are assigned in order of each component's lowest dynamic vertex id and
/// are not stable across snapshots.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Returns the raw component index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Component membership and sizes of a graph at one point in time.
///
/// The largest component (LCC) is the one with the most vertices; ties go to
/// the lowest [`ComponentId`]. The second-largest (SLCC) size is the largest
/// size among the remaining components, or zero when there are none.
///
/// # Examples
/// ```
/// use dismantle_core::{Components, Graph, StaticId};
///
/// let mut graph = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
/// let centre = graph.dynamic_id(StaticId::new(3)).expect("vertex exists");
/// graph.clear_vertex(centre).expect("slot exists");
///
/// let components = Components::measure(&graph);
/// assert_eq!(components.lcc_size(), 2);
/// assert_eq!(components.slcc_size(), 2);
/// assert_eq!(components.component_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Components {
    membership: Vec<ComponentId>,
    sizes: Vec<usize>,
    lcc: Option<ComponentId>,
    lcc_size: usize,
    slcc_size: usize,
}

impl Components {
    /// Computes the components of `graph`.
    #[must_use]
    pub fn measure(graph: &Graph) -> Self {
        let adjacency = graph.adjacency();
        let n = adjacency.len();
        let mut sets = DisjointSet::new(n);
        for (u, row) in adjacency.iter().enumerate() {
            for &v in row.iter().filter(|&&v| u < v) {
                sets.union(u, v);
            }
        }

        let mut by_root: Vec<Option<ComponentId>> = vec![None; n];
        let mut membership = Vec::with_capacity(n);
        let mut sizes = Vec::new();
        for vertex in 0..n {
            let root = sets.find(vertex);
            let component = *by_root[root].get_or_insert_with(|| {
                sizes.push(sets.size_of_root(root));
                ComponentId(sizes.len() - 1)
            });
            membership.push(component);
        }

        let (lcc, lcc_size, slcc_size) = rank_sizes(&sizes);
        Self {
            membership,
            sizes,
            lcc,
            lcc_size,
            slcc_size,
        }
    }

    /// Component holding `vertex`, if the slot exists.
    #[must_use]
    pub fn component_of(&self, vertex: DynamicId) -> Option<ComponentId> {
        self.membership.get(vertex.index()).copied()
    }

    /// Number of vertices in `component`; zero for unknown ids.
    #[must_use]
    pub fn size_of(&self, component: ComponentId) -> usize {
        self.sizes.get(component.0).copied().unwrap_or(0)
    }

    /// Per-vertex component ids, indexed by dynamic id.
    #[must_use]
    pub fn membership(&self) -> &[ComponentId] {
        &self.membership
    }

    /// Number of components, counting isolated vertices.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.sizes.len()
    }

    /// The largest component, or `None` for an empty graph.
    #[must_use]
    pub fn lcc(&self) -> Option<ComponentId> {
        self.lcc
    }

    /// Size of the largest component.
    #[must_use]
    pub fn lcc_size(&self) -> usize {
        self.lcc_size
    }

    /// Size of the second-largest component.
    #[must_use]
    pub fn slcc_size(&self) -> usize {
        self.slcc_size
    }

    /// Returns `true` when `vertex` currently belongs to the largest component.
    #[must_use]
    pub fn contains_in_lcc(&self, vertex: DynamicId) -> bool {
        self.lcc.is_some() && self.component_of(vertex) == self.lcc
    }
}

/// Shorthand for [`Components::measure`].
#[must_use]
pub fn connectivity(graph: &Graph) -> Components {
    Components::measure(graph)
}

fn rank_sizes(sizes: &[usize]) -> (Option<ComponentId>, usize, usize) {
    let mut lcc: Option<ComponentId> = None;
    let mut lcc_size = 0;
    for (id, &size) in sizes.iter().enumerate() {
        if lcc.is_none() || size > lcc_size {
            lcc = Some(ComponentId(id));
            lcc_size = size;
        }
    }
    let slcc_size = sizes
        .iter()
        .enumerate()
        .filter(|&(id, _)| Some(ComponentId(id)) != lcc)
        .map(|(_, &size)| size)
        .max()
        .unwrap_or(0);
    (lcc, lcc_size, slcc_size)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::graph::{GraphBuilder, StaticId};

    #[rstest]
    fn empty_graph_has_no_components() {
        let graph = GraphBuilder::new("empty").build();
        let components = Components::measure(&graph);
        assert_eq!(components.lcc(), None);
        assert_eq!(components.lcc_size(), 0);
        assert_eq!(components.slcc_size(), 0);
        assert!(!components.contains_in_lcc(DynamicId::new(0)));
    }

    #[rstest]
    fn single_component_has_zero_slcc() {
        let graph = Graph::from_edges("triangle", [(1_u64, 2_u64), (2, 3), (3, 1)]);
        let components = Components::measure(&graph);
        assert_eq!(components.lcc_size(), 3);
        assert_eq!(components.slcc_size(), 0);
        assert_eq!(components.component_count(), 1);
    }

    #[rstest]
    #[case(&[(1, 2), (3, 4)], 2, 2)]
    #[case(&[(1, 2), (2, 3), (4, 5)], 3, 2)]
    #[case(&[(1, 2), (3, 4), (4, 5), (6, 7)], 3, 2)]
    fn ranks_the_two_largest(
        #[case] edges: &[(u64, u64)],
        #[case] lcc: usize,
        #[case] slcc: usize,
    ) {
        let graph = Graph::from_edges("forest", edges.iter().copied());
        let components = Components::measure(&graph);
        assert_eq!(components.lcc_size(), lcc);
        assert_eq!(components.slcc_size(), slcc);
    }

    #[rstest]
    fn ties_go_to_lowest_component_id() {
        let graph = Graph::from_edges("pairs", [(1_u64, 2_u64), (3, 4)]);
        let components = Components::measure(&graph);
        let first = graph.dynamic_id(StaticId::new(1)).expect("vertex exists");
        let other = graph.dynamic_id(StaticId::new(3)).expect("vertex exists");
        assert_eq!(components.lcc(), components.component_of(first));
        assert!(components.contains_in_lcc(first));
        assert!(!components.contains_in_lcc(other));
    }

    #[rstest]
    fn cleared_vertices_are_singletons() {
        let mut graph = Graph::from_edges("star", [(0_u64, 1_u64), (0, 2), (0, 3)]);
        let hub = graph.dynamic_id(StaticId::new(0)).expect("vertex exists");
        graph.clear_vertex(hub).expect("slot exists");
        let components = connectivity(&graph);
        assert_eq!(components.component_count(), 4);
        assert_eq!(components.lcc_size(), 1);
        assert_eq!(components.slcc_size(), 1);
        let hub_component = components.component_of(hub).expect("slot exists");
        assert_eq!(components.size_of(hub_component), 1);
    }
}
