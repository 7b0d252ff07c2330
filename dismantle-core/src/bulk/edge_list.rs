//! Persistent static-id edge list handed to bulk engines.

use std::collections::{HashMap, HashSet};

use crate::graph::{Graph, GraphIdentity, StaticId};

/// Graph translated to static ids, with self-loops and parallel edges
/// removed. Vertex order follows the source graph's slots.
///
/// # Examples
/// ```
/// use dismantle_core::{EdgeListGraph, GraphIdentity, StaticId};
///
/// let graph = EdgeListGraph::new(
///     GraphIdentity::from("raw"),
///     [1_u64, 2, 3].map(StaticId::new).to_vec(),
///     vec![
///         (StaticId::new(1), StaticId::new(2)),
///         (StaticId::new(2), StaticId::new(1)),
///         (StaticId::new(3), StaticId::new(3)),
///     ],
/// );
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.vertex_count(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeListGraph {
    identity: GraphIdentity,
    vertices: Vec<StaticId>,
    edges: Vec<(StaticId, StaticId)>,
}

impl EdgeListGraph {
    /// Builds an edge list, normalising every edge to `(min, max)` and
    /// dropping loops and duplicates. Repeated vertices keep their first
    /// position; edge endpoints missing from `vertices` are appended.
    #[must_use]
    pub fn new(
        identity: GraphIdentity,
        vertices: Vec<StaticId>,
        edges: Vec<(StaticId, StaticId)>,
    ) -> Self {
        let mut known = HashSet::with_capacity(vertices.len());
        let mut vertices: Vec<StaticId> = vertices
            .into_iter()
            .filter(|&v| known.insert(v))
            .collect();

        let mut edges: Vec<(StaticId, StaticId)> = edges
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        edges.sort_unstable();
        edges.dedup();

        for &(a, b) in &edges {
            for v in [a, b] {
                if known.insert(v) {
                    vertices.push(v);
                }
            }
        }
        Self {
            identity,
            vertices,
            edges,
        }
    }

    /// Translates `graph`, keeping cleared vertices as isolated entries.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        Self::new(
            graph.identity().clone(),
            graph.vertices().map(|(_, id)| id).collect(),
            graph.edges().collect(),
        )
    }

    /// Identity of the source graph.
    #[must_use]
    pub fn identity(&self) -> &GraphIdentity {
        &self.identity
    }

    /// Every vertex, isolated ones included.
    #[must_use]
    pub fn vertices(&self) -> &[StaticId] {
        &self.vertices
    }

    /// Normalised, sorted edges.
    #[must_use]
    pub fn edges(&self) -> &[(StaticId, StaticId)] {
        &self.edges
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Slot of every vertex, keyed by static id.
    pub(crate) fn index(&self) -> HashMap<StaticId, usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(slot, &id)| (id, slot))
            .collect()
    }

    /// Adjacency lists over vertex slots.
    pub(crate) fn adjacency(&self, index: &HashMap<StaticId, usize>) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for (a, b) in &self.edges {
            if let (Some(&u), Some(&v)) = (index.get(a), index.get(b)) {
                adjacency[u].push(v);
                adjacency[v].push(u);
            }
        }
        adjacency
    }

    /// Rebuilds a mutable [`Graph`] with the same vertex order.
    pub(crate) fn to_graph(&self) -> Graph {
        let mut builder = crate::graph::GraphBuilder::new(self.identity.clone());
        for &vertex in &self.vertices {
            // unique by construction
            let _ = builder.add_vertex(vertex);
        }
        for &(a, b) in &self.edges {
            builder.add_edge(a, b);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_keeps_cleared_vertices() {
        let mut graph = Graph::from_edges("star", [(0_u64, 1_u64), (0, 2)]);
        let hub = graph.dynamic_id(StaticId::new(0)).expect("vertex exists");
        graph.clear_vertex(hub).expect("slot exists");
        let edges = EdgeListGraph::from_graph(&graph);
        assert_eq!(edges.vertex_count(), 3);
        assert_eq!(edges.edge_count(), 0);
        assert_eq!(edges.identity().as_str(), "star");
    }

    #[test]
    fn round_trips_through_graph() {
        let graph = Graph::from_edges("tri", [(5_u64, 6_u64), (6, 7), (7, 5)]);
        let rebuilt = EdgeListGraph::from_graph(&graph).to_graph();
        assert_eq!(rebuilt.vertex_count(), 3);
        assert_eq!(rebuilt.edge_count(), 3);
        assert_eq!(
            rebuilt.dynamic_id(StaticId::new(6)),
            graph.dynamic_id(StaticId::new(6))
        );
    }
}
