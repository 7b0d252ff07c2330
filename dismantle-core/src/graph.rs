//! Mutable undirected graph with stable vertex identifiers.
//!
//! Vertices carry a [`StaticId`] assigned at load time and a [`DynamicId`]
//! (their current slot in the vertex table). Dismantling only ever clears
//! vertices, so dynamic ids stay valid for a whole run; physical deletion via
//! [`Graph::remove_vertex`] swaps the last vertex into the freed slot and
//! bumps [`Graph::structural_epoch`].

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use crate::error::GraphError;

/// Vertex identifier fixed at load time and used in every reported result.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct StaticId(u64);

impl StaticId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for StaticId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for StaticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Current slot of a vertex inside a [`Graph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DynamicId(usize);

impl DynamicId {
    /// Wraps a raw slot index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw slot index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DynamicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a graph, used in logs, errors and as the translation-cache key.
///
/// # Examples
/// ```
/// use dismantle_core::GraphIdentity;
///
/// let identity = GraphIdentity::from("corruption");
/// assert_eq!(identity.as_str(), "corruption");
/// assert_eq!(identity.to_string(), "corruption");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GraphIdentity(Arc<str>);

impl GraphIdentity {
    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GraphIdentity {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for GraphIdentity {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<Arc<str>> for GraphIdentity {
    fn from(name: Arc<str>) -> Self {
        Self(name)
    }
}

impl fmt::Display for GraphIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incrementally assembles a simple undirected [`Graph`].
///
/// Self-loops and parallel edges are dropped on insertion.
///
/// # Examples
/// ```
/// use dismantle_core::{GraphBuilder, StaticId};
///
/// let mut builder = GraphBuilder::new("triangle");
/// assert!(builder.add_edge(StaticId::new(1), StaticId::new(2)));
/// assert!(builder.add_edge(StaticId::new(2), StaticId::new(3)));
/// assert!(builder.add_edge(StaticId::new(3), StaticId::new(1)));
/// assert!(!builder.add_edge(StaticId::new(1), StaticId::new(3)));
/// let graph = builder.build();
/// assert_eq!(graph.vertex_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    identity: GraphIdentity,
    static_ids: Vec<StaticId>,
    index: HashMap<StaticId, usize>,
    adjacency: Vec<Vec<usize>>,
    seen: HashSet<(usize, usize)>,
}

impl GraphBuilder {
    /// Starts an empty graph with the given identity.
    #[must_use]
    pub fn new(identity: impl Into<GraphIdentity>) -> Self {
        Self {
            identity: identity.into(),
            static_ids: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Adds an isolated vertex.
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateVertex`] when `vertex` already exists.
    pub fn add_vertex(&mut self, vertex: StaticId) -> Result<DynamicId, GraphError> {
        if self.index.contains_key(&vertex) {
            return Err(GraphError::DuplicateVertex { vertex });
        }
        Ok(DynamicId(self.insert(vertex)))
    }

    /// Adds an undirected edge between two static ids, creating missing
    /// vertices. Returns `false` when the edge was a self-loop or already
    /// present.
    pub fn add_edge(&mut self, a: StaticId, b: StaticId) -> bool {
        let left = self.ensure(a);
        let right = self.ensure(b);
        if left == right {
            return false;
        }
        let key = (left.min(right), left.max(right));
        if !self.seen.insert(key) {
            return false;
        }
        self.adjacency[left].push(right);
        self.adjacency[right].push(left);
        true
    }

    /// Number of vertices added so far.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.static_ids.len()
    }

    /// Finalises the graph.
    #[must_use]
    pub fn build(self) -> Graph {
        Graph {
            identity: self.identity,
            static_ids: self.static_ids,
            index: self.index,
            adjacency: self.adjacency,
            edge_count: self.seen.len(),
            epoch: 0,
        }
    }

    fn ensure(&mut self, vertex: StaticId) -> usize {
        match self.index.get(&vertex) {
            Some(&slot) => slot,
            None => self.insert(vertex),
        }
    }

    fn insert(&mut self, vertex: StaticId) -> usize {
        let slot = self.static_ids.len();
        self.static_ids.push(vertex);
        self.index.insert(vertex, slot);
        self.adjacency.push(Vec::new());
        slot
    }
}

/// Simple undirected graph owned by the engine for the length of a run.
#[derive(Clone, Debug)]
pub struct Graph {
    identity: GraphIdentity,
    static_ids: Vec<StaticId>,
    index: HashMap<StaticId, usize>,
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
    epoch: u64,
}

impl Graph {
    /// Builds a graph from an edge list in one call.
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::Graph;
    ///
    /// let path = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
    /// assert_eq!(path.vertex_count(), 5);
    /// assert_eq!(path.edge_count(), 4);
    /// ```
    #[must_use]
    pub fn from_edges<I, A>(identity: impl Into<GraphIdentity>, edges: I) -> Self
    where
        I: IntoIterator<Item = (A, A)>,
        A: Into<StaticId>,
    {
        let mut builder = GraphBuilder::new(identity);
        for (a, b) in edges {
            builder.add_edge(a.into(), b.into());
        }
        builder.build()
    }

    /// Returns the identity of the graph.
    #[must_use]
    pub fn identity(&self) -> &GraphIdentity {
        &self.identity
    }

    /// Number of vertices, including cleared ones.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.static_ids.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns `true` when the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.static_ids.is_empty()
    }

    /// Counter incremented on every physical vertex deletion.
    #[must_use]
    pub fn structural_epoch(&self) -> u64 {
        self.epoch
    }

    /// Resolves a dynamic id to the vertex's static id.
    #[must_use]
    pub fn static_id(&self, vertex: DynamicId) -> Option<StaticId> {
        self.static_ids.get(vertex.0).copied()
    }

    /// Resolves a static id to the vertex's current slot.
    #[must_use]
    pub fn dynamic_id(&self, vertex: StaticId) -> Option<DynamicId> {
        self.index.get(&vertex).copied().map(DynamicId)
    }

    /// Iterates over the neighbours of `vertex`; empty when out of bounds.
    pub fn neighbours(&self, vertex: DynamicId) -> impl Iterator<Item = DynamicId> + '_ {
        self.adjacency
            .get(vertex.0)
            .into_iter()
            .flatten()
            .copied()
            .map(DynamicId)
    }

    /// Degree of `vertex`; zero when out of bounds.
    #[must_use]
    pub fn degree(&self, vertex: DynamicId) -> usize {
        self.adjacency.get(vertex.0).map_or(0, Vec::len)
    }

    /// Iterates over all vertices in slot order.
    pub fn vertices(&self) -> impl Iterator<Item = (DynamicId, StaticId)> + '_ {
        self.static_ids
            .iter()
            .enumerate()
            .map(|(slot, &id)| (DynamicId(slot), id))
    }

    /// Iterates over every edge once as a pair of static ids.
    pub fn edges(&self) -> impl Iterator<Item = (StaticId, StaticId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(u, row)| {
            row.iter()
                .filter(move |&&v| u < v)
                .map(move |&v| (self.static_ids[u], self.static_ids[v]))
        })
    }

    /// Removes every edge incident to `vertex` and returns how many were
    /// removed. The vertex stays in the graph as an isolated singleton.
    ///
    /// # Errors
    /// Returns [`GraphError::IndexOutOfBounds`] when `vertex` is not a slot.
    pub fn clear_vertex(&mut self, vertex: DynamicId) -> Result<usize, GraphError> {
        let slot = self.check(vertex)?;
        let neighbours = std::mem::take(&mut self.adjacency[slot]);
        for &n in &neighbours {
            self.adjacency[n].retain(|&x| x != slot);
        }
        self.edge_count -= neighbours.len();
        Ok(neighbours.len())
    }

    /// Removes the edge between `a` and `b`, returning whether it existed.
    pub fn remove_edge(&mut self, a: DynamicId, b: DynamicId) -> bool {
        let (Some(row), true) = (self.adjacency.get(a.0), b.0 < self.adjacency.len()) else {
            return false;
        };
        if !row.contains(&b.0) {
            return false;
        }
        self.adjacency[a.0].retain(|&x| x != b.0);
        self.adjacency[b.0].retain(|&x| x != a.0);
        self.edge_count -= 1;
        true
    }

    /// Physically deletes `vertex`. The last vertex moves into the freed
    /// slot, so any dynamic id held by callers may now be stale.
    ///
    /// # Errors
    /// Returns [`GraphError::IndexOutOfBounds`] when `vertex` is not a slot.
    pub fn remove_vertex(&mut self, vertex: DynamicId) -> Result<StaticId, GraphError> {
        self.clear_vertex(vertex)?;
        let slot = vertex.0;
        let last = self.static_ids.len() - 1;
        let removed = self.static_ids.swap_remove(slot);
        self.adjacency.swap_remove(slot);
        self.index.remove(&removed);
        if slot != last {
            let moved = self.static_ids[slot];
            self.index.insert(moved, slot);
            let neighbours = self.adjacency[slot].clone();
            for n in neighbours {
                for entry in &mut self.adjacency[n] {
                    if *entry == last {
                        *entry = slot;
                    }
                }
            }
        }
        self.epoch += 1;
        Ok(removed)
    }

    pub(crate) fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    fn check(&self, vertex: DynamicId) -> Result<usize, GraphError> {
        if vertex.0 < self.static_ids.len() {
            Ok(vertex.0)
        } else {
            Err(GraphError::IndexOutOfBounds {
                index: vertex.0,
                vertex_count: self.static_ids.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn path() -> Graph {
        Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)])
    }

    fn id(graph: &Graph, raw: u64) -> DynamicId {
        graph
            .dynamic_id(StaticId::new(raw))
            .expect("vertex must exist")
    }

    #[rstest]
    fn builder_rejects_duplicate_vertices() {
        let mut builder = GraphBuilder::new("dup");
        builder
            .add_vertex(StaticId::new(7))
            .expect("first insert succeeds");
        let err = builder
            .add_vertex(StaticId::new(7))
            .expect_err("second insert must fail");
        assert_eq!(
            err,
            GraphError::DuplicateVertex {
                vertex: StaticId::new(7)
            }
        );
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    fn builder_drops_loops_and_parallel_edges(#[case] a: u64, #[case] b: u64) {
        let mut builder = GraphBuilder::new("simple");
        builder.add_edge(StaticId::new(1), StaticId::new(2));
        assert!(!builder.add_edge(StaticId::new(a), StaticId::new(b)));
        let graph = builder.build();
        assert_eq!(graph.edge_count(), 1);
    }

    #[rstest]
    fn clear_vertex_keeps_slot(mut path: Graph) {
        let centre = id(&path, 3);
        assert_eq!(path.clear_vertex(centre).expect("slot exists"), 2);
        assert_eq!(path.vertex_count(), 5);
        assert_eq!(path.edge_count(), 2);
        assert_eq!(path.degree(centre), 0);
        assert_eq!(path.degree(id(&path, 2)), 1);
        assert_eq!(path.static_id(centre), Some(StaticId::new(3)));
        assert_eq!(path.structural_epoch(), 0);
    }

    #[rstest]
    fn clear_vertex_rejects_unknown_slot(mut path: Graph) {
        let err = path
            .clear_vertex(DynamicId::new(99))
            .expect_err("slot is out of bounds");
        assert_eq!(err.code(), crate::error::GraphErrorCode::IndexOutOfBounds);
    }

    #[rstest]
    fn remove_edge_reports_presence(mut path: Graph) {
        let (a, b) = (id(&path, 1), id(&path, 2));
        assert!(path.remove_edge(b, a));
        assert!(!path.remove_edge(a, b));
        assert_eq!(path.edge_count(), 3);
    }

    #[rstest]
    fn remove_vertex_reindexes_last_slot(mut path: Graph) {
        let removed = path.remove_vertex(id(&path, 2)).expect("slot exists");
        assert_eq!(removed, StaticId::new(2));
        assert_eq!(path.vertex_count(), 4);
        assert_eq!(path.dynamic_id(StaticId::new(2)), None);
        assert_eq!(path.structural_epoch(), 1);
        // vertex 5 was the last slot and now sits where 2 used to be.
        let five = id(&path, 5);
        assert_eq!(five, DynamicId::new(1));
        let neighbours: Vec<_> = path
            .neighbours(five)
            .filter_map(|n| path.static_id(n))
            .collect();
        assert_eq!(neighbours, vec![StaticId::new(4)]);
        let mut edges: Vec<_> = path
            .edges()
            .map(|(a, b)| (a.get().min(b.get()), a.get().max(b.get())))
            .collect();
        edges.sort_unstable();
        assert_eq!(edges, vec![(3, 4), (4, 5)]);
    }

    #[rstest]
    fn edges_are_reported_once(path: Graph) {
        assert_eq!(path.edges().count(), path.edge_count());
    }
}
