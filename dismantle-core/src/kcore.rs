//! Core-number decomposition of the current graph state.
//!
//! Uses Batagelj-Zaversnik bucket peeling, O(V + E). Like the connectivity
//! view it is recomputed from scratch after every accepted removal.

use crate::graph::{DynamicId, Graph};

/// Per-vertex core numbers of a graph at one point in time.
///
/// # Examples
/// ```
/// use dismantle_core::{CoreNumbers, Graph, StaticId};
///
/// // A triangle with a pendant vertex hanging off it.
/// let graph = Graph::from_edges("kite", [(1_u64, 2_u64), (2, 3), (3, 1), (3, 4)]);
/// let cores = CoreNumbers::compute(&graph);
/// let tail = graph.dynamic_id(StaticId::new(4)).expect("vertex exists");
/// let apex = graph.dynamic_id(StaticId::new(1)).expect("vertex exists");
/// assert_eq!(cores.core(tail), Some(1));
/// assert!(cores.in_two_core(apex));
/// assert_eq!(cores.two_core_size(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreNumbers {
    cores: Vec<usize>,
    two_core_size: usize,
}

impl CoreNumbers {
    /// Computes the core number of every vertex in `graph`.
    #[must_use]
    pub fn compute(graph: &Graph) -> Self {
        let adjacency = graph.adjacency();
        let n = adjacency.len();
        let mut degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();
        let max_degree = degree.iter().copied().max().unwrap_or(0);

        // bin[d] holds the first position of degree-d vertices in `order`.
        let mut bin = vec![0_usize; max_degree + 1];
        for &d in &degree {
            bin[d] += 1;
        }
        let mut start = 0;
        for slot in &mut bin {
            let count = *slot;
            *slot = start;
            start += count;
        }

        let mut position = vec![0_usize; n];
        let mut order = vec![0_usize; n];
        for (v, &d) in degree.iter().enumerate() {
            position[v] = bin[d];
            order[position[v]] = v;
            bin[d] += 1;
        }
        for d in (1..=max_degree).rev() {
            bin[d] = bin[d - 1];
        }
        bin[0] = 0;

        for i in 0..n {
            let v = order[i];
            for &u in &adjacency[v] {
                if degree[u] > degree[v] {
                    let du = degree[u];
                    let pu = position[u];
                    let pw = bin[du];
                    let w = order[pw];
                    if u != w {
                        position[u] = pw;
                        position[w] = pu;
                        order[pu] = w;
                        order[pw] = u;
                    }
                    bin[du] += 1;
                    degree[u] -= 1;
                }
            }
        }

        let two_core_size = degree.iter().filter(|&&core| core > 1).count();
        Self {
            cores: degree,
            two_core_size,
        }
    }

    /// Core number of `vertex`, if the slot exists.
    #[must_use]
    pub fn core(&self, vertex: DynamicId) -> Option<usize> {
        self.cores.get(vertex.index()).copied()
    }

    /// Returns `true` when `vertex` belongs to the 2-core.
    #[must_use]
    pub fn in_two_core(&self, vertex: DynamicId) -> bool {
        self.core(vertex).is_some_and(|core| core > 1)
    }

    /// Number of vertices in the 2-core.
    #[must_use]
    pub fn two_core_size(&self) -> usize {
        self.two_core_size
    }

    /// Returns `true` when the remaining structure is a forest.
    #[must_use]
    pub fn two_core_is_empty(&self) -> bool {
        self.two_core_size == 0
    }

    /// Per-vertex core numbers, indexed by dynamic id.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.cores
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::graph::{GraphBuilder, StaticId};

    fn cores_by_static(graph: &Graph) -> Vec<(u64, usize)> {
        let cores = CoreNumbers::compute(graph);
        let mut out: Vec<_> = graph
            .vertices()
            .map(|(dynamic, id)| (id.get(), cores.core(dynamic).unwrap_or(0)))
            .collect();
        out.sort_unstable();
        out
    }

    #[rstest]
    fn empty_graph_has_empty_two_core() {
        let cores = CoreNumbers::compute(&GraphBuilder::new("empty").build());
        assert!(cores.two_core_is_empty());
        assert!(cores.as_slice().is_empty());
    }

    #[rstest]
    fn trees_have_core_one() {
        let graph = Graph::from_edges("tree", [(1_u64, 2_u64), (1, 3), (3, 4), (3, 5)]);
        assert!(CoreNumbers::compute(&graph).two_core_is_empty());
        assert!(cores_by_static(&graph).iter().all(|&(_, core)| core == 1));
    }

    #[rstest]
    fn clique_with_tail() {
        // K4 on {1,2,3,4}, a cycle {4,5,6} and a pendant 7.
        let graph = Graph::from_edges(
            "mixed",
            [
                (1_u64, 2_u64),
                (1, 3),
                (1, 4),
                (2, 3),
                (2, 4),
                (3, 4),
                (4, 5),
                (5, 6),
                (6, 4),
                (6, 7),
            ],
        );
        assert_eq!(
            cores_by_static(&graph),
            vec![(1, 3), (2, 3), (3, 3), (4, 3), (5, 2), (6, 2), (7, 1)]
        );
        assert_eq!(CoreNumbers::compute(&graph).two_core_size(), 6);
    }

    #[rstest]
    fn clearing_a_cycle_vertex_empties_the_two_core() {
        let mut graph = Graph::from_edges("cycle", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 1)]);
        assert_eq!(CoreNumbers::compute(&graph).two_core_size(), 4);
        let v = graph.dynamic_id(StaticId::new(2)).expect("vertex exists");
        graph.clear_vertex(v).expect("slot exists");
        let cores = CoreNumbers::compute(&graph);
        assert!(cores.two_core_is_empty());
        assert_eq!(cores.core(v), Some(0));
    }
}
