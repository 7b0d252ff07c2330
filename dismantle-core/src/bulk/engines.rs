//! Built-in bulk engines for precomputed removal orders.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::EdgeListGraph;
use crate::{
    connectivity::{Components, union_find::DisjointSet},
    error::BulkEngineError,
    graph::StaticId,
    policy::PolicyKind,
};

/// One step of a bulk dismantling sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BulkStep {
    /// Removed vertex.
    pub vertex: StaticId,
    /// Largest component size after the removal.
    pub lcc_size: usize,
    /// Second-largest component size after the removal.
    pub slcc_size: usize,
}

/// Engine that dismantles a graph along a fixed order in a single call.
pub trait BulkDismantler {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Acceptance rule the engine applies.
    fn policy(&self) -> PolicyKind {
        PolicyKind::Threshold
    }

    /// Removes vertices in `order` until the largest component has at most
    /// `stop_condition` vertices, returning one step per removal.
    ///
    /// # Errors
    /// Returns [`BulkEngineError::UnknownVertex`] or
    /// [`BulkEngineError::DuplicateVertex`] for malformed orders, or an
    /// engine-specific failure.
    fn dismantle(
        &self,
        graph: &EdgeListGraph,
        order: &[StaticId],
        stop_condition: usize,
    ) -> Result<Vec<BulkStep>, BulkEngineError>;
}

/// Removes every vertex in order; answers all prefixes at once by adding the
/// vertices back in reverse and tracking component sizes with a
/// disjoint-set forest.
///
/// # Examples
/// ```
/// use dismantle_core::{BulkDismantler, EdgeListGraph, Graph, StaticId, ThresholdBulkEngine};
///
/// let graph = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
/// let edges = EdgeListGraph::from_graph(&graph);
/// let order = [3_u64, 1, 2].map(StaticId::new);
/// let steps = ThresholdBulkEngine.dismantle(&edges, &order, 1).expect("order is valid");
/// let sizes: Vec<_> = steps.iter().map(|s| (s.lcc_size, s.slcc_size)).collect();
/// assert_eq!(sizes, vec![(2, 2), (2, 1), (2, 1)]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ThresholdBulkEngine;

impl BulkDismantler for ThresholdBulkEngine {
    fn name(&self) -> &str {
        "threshold"
    }

    fn dismantle(
        &self,
        graph: &EdgeListGraph,
        order: &[StaticId],
        stop_condition: usize,
    ) -> Result<Vec<BulkStep>, BulkEngineError> {
        let index = graph.index();
        let slots = resolve_order(&index, order)?;
        let adjacency = graph.adjacency(&index);
        let n = graph.vertex_count();

        let mut active = vec![true; n];
        for &slot in &slots {
            active[slot] = false;
        }
        let mut sizes = SizeMultiset::singletons(n);
        let mut sets = DisjointSet::new(n);
        for (u, row) in adjacency.iter().enumerate() {
            for &v in row.iter().filter(|&&v| u < v && active[u] && active[v]) {
                merge(&mut sets, &mut sizes, u, v);
            }
        }

        // after[i] holds the sizes once the first i + 1 vertices are gone.
        let mut after = vec![(0, 0); slots.len()];
        for i in (0..slots.len()).rev() {
            after[i] = sizes.top_two();
            let slot = slots[i];
            active[slot] = true;
            for &v in &adjacency[slot] {
                if active[v] {
                    merge(&mut sets, &mut sizes, slot, v);
                }
            }
        }

        let mut steps = Vec::with_capacity(order.len());
        for (&vertex, (lcc_size, slcc_size)) in order.iter().zip(after) {
            steps.push(BulkStep {
                vertex,
                lcc_size,
                slcc_size,
            });
            if lcc_size <= stop_condition {
                break;
            }
        }
        Ok(steps)
    }
}

/// Removes a vertex only while it belongs to the current largest component;
/// other vertices are skipped without a step.
#[derive(Clone, Copy, Debug, Default)]
pub struct LccThresholdBulkEngine;

impl BulkDismantler for LccThresholdBulkEngine {
    fn name(&self) -> &str {
        "lcc_threshold"
    }

    fn policy(&self) -> PolicyKind {
        PolicyKind::LccGated
    }

    fn dismantle(
        &self,
        graph: &EdgeListGraph,
        order: &[StaticId],
        stop_condition: usize,
    ) -> Result<Vec<BulkStep>, BulkEngineError> {
        resolve_order(&graph.index(), order)?;
        let mut working = graph.to_graph();
        let mut components = Components::measure(&working);
        let mut steps = Vec::new();
        for &vertex in order {
            let slot = working
                .dynamic_id(vertex)
                .ok_or(BulkEngineError::UnknownVertex { vertex })?;
            if components.contains_in_lcc(slot) {
                working
                    .clear_vertex(slot)
                    .map_err(|error| BulkEngineError::Failed {
                        reason: error.to_string(),
                    })?;
                components = Components::measure(&working);
                steps.push(BulkStep {
                    vertex,
                    lcc_size: components.lcc_size(),
                    slcc_size: components.slcc_size(),
                });
            }
            if components.lcc_size() <= stop_condition {
                break;
            }
        }
        Ok(steps)
    }
}

fn resolve_order(
    index: &HashMap<StaticId, usize>,
    order: &[StaticId],
) -> Result<Vec<usize>, BulkEngineError> {
    let mut seen = HashSet::with_capacity(order.len());
    order
        .iter()
        .map(|&vertex| {
            let slot = *index
                .get(&vertex)
                .ok_or(BulkEngineError::UnknownVertex { vertex })?;
            if !seen.insert(slot) {
                return Err(BulkEngineError::DuplicateVertex { vertex });
            }
            Ok(slot)
        })
        .collect()
}

fn merge(sets: &mut DisjointSet, sizes: &mut SizeMultiset, u: usize, v: usize) {
    let (ru, rv) = (sets.find(u), sets.find(v));
    if ru == rv {
        return;
    }
    sizes.remove(sets.size_of_root(ru));
    sizes.remove(sets.size_of_root(rv));
    let root = sets.union(ru, rv);
    sizes.insert(sets.size_of_root(root));
}

/// Multiset of component sizes.
#[derive(Debug, Default)]
struct SizeMultiset {
    counts: BTreeMap<usize, usize>,
}

impl SizeMultiset {
    fn singletons(n: usize) -> Self {
        let mut counts = BTreeMap::new();
        if n > 0 {
            counts.insert(1, n);
        }
        Self { counts }
    }

    fn insert(&mut self, size: usize) {
        *self.counts.entry(size).or_insert(0) += 1;
    }

    fn remove(&mut self, size: usize) {
        if let Some(count) = self.counts.get_mut(&size) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&size);
            }
        }
    }

    fn top_two(&self) -> (usize, usize) {
        let mut largest = self.counts.iter().rev();
        match largest.next() {
            None => (0, 0),
            Some((&size, &count)) if count > 1 => (size, size),
            Some((&size, _)) => (size, largest.next().map_or(0, |(&next, _)| next)),
        }
    }
}
