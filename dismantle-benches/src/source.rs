//! Seeded synthetic graphs for benchmarking.
//!
//! Graphs grow by preferential attachment, so they carry the heavy-tailed
//! degree distribution that makes degree-ranked dismantling interesting.

use dismantle_core::{Graph, GraphBuilder, StaticId};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors that may occur during synthetic graph generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested attachment count was zero.
    #[error("attachment count must be greater than zero")]
    ZeroAttachment,
    /// The graph would not outgrow its seed clique.
    #[error("vertex count {vertex_count} must exceed the attachment count {attachment}")]
    TooFewVertices {
        /// Requested vertex count.
        vertex_count: usize,
        /// Requested attachment count.
        attachment: usize,
    },
}

/// Configuration for preferential-attachment generation.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of vertices to generate.
    pub vertex_count: usize,
    /// Edges added by every new vertex.
    pub attachment: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates a preferential-attachment graph with static ids `0..n`.
///
/// The first `attachment + 1` vertices form a clique; every later vertex
/// links to `attachment` distinct earlier vertices drawn proportionally to
/// their degree.
///
/// # Errors
/// Returns [`SyntheticError::ZeroAttachment`] if `attachment` is zero, or
/// [`SyntheticError::TooFewVertices`] if `vertex_count <= attachment`.
///
/// # Examples
/// ```
/// use dismantle_benches::source::{SyntheticConfig, preferential_attachment};
///
/// let config = SyntheticConfig { vertex_count: 50, attachment: 2, seed: 7 };
/// let graph = preferential_attachment(&config).expect("valid config");
/// assert_eq!(graph.vertex_count(), 50);
/// assert_eq!(graph.edge_count(), 3 + 47 * 2);
/// ```
pub fn preferential_attachment(config: &SyntheticConfig) -> Result<Graph, SyntheticError> {
    let SyntheticConfig {
        vertex_count,
        attachment,
        seed,
    } = *config;
    if attachment == 0 {
        return Err(SyntheticError::ZeroAttachment);
    }
    if vertex_count <= attachment {
        return Err(SyntheticError::TooFewVertices {
            vertex_count,
            attachment,
        });
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new(format!("pa-{vertex_count}-{attachment}-{seed}"));
    // Every edge endpoint, so a uniform pick is a degree-weighted pick.
    let mut endpoints: Vec<u64> = Vec::with_capacity(vertex_count.saturating_mul(attachment) * 2);

    let seed_size = attachment as u64 + 1;
    for a in 0..seed_size {
        for b in (a + 1)..seed_size {
            builder.add_edge(StaticId::new(a), StaticId::new(b));
            endpoints.extend([a, b]);
        }
    }

    let mut targets = Vec::with_capacity(attachment);
    for vertex in seed_size..vertex_count as u64 {
        targets.clear();
        while targets.len() < attachment {
            let pick = endpoints
                .get(rng.gen_range(0..endpoints.len()))
                .copied()
                .unwrap_or_default();
            if !targets.contains(&pick) {
                targets.push(pick);
            }
        }
        for &target in &targets {
            builder.add_edge(StaticId::new(vertex), StaticId::new(target));
            endpoints.extend([vertex, target]);
        }
    }
    Ok(builder.build())
}

/// Scores every vertex by its degree, the classic static attack order.
#[must_use]
pub fn degree_scores(graph: &Graph) -> Vec<(StaticId, f64)> {
    graph
        .vertices()
        .map(|(slot, id)| (id, f64::from(u32::try_from(graph.degree(slot)).unwrap_or(u32::MAX))))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn config(vertex_count: usize, attachment: usize) -> SyntheticConfig {
        SyntheticConfig {
            vertex_count,
            attachment,
            seed: 42,
        }
    }

    #[rstest]
    #[case(config(10, 0), SyntheticError::ZeroAttachment)]
    #[case(config(3, 3), SyntheticError::TooFewVertices { vertex_count: 3, attachment: 3 })]
    fn rejects_degenerate_configs(#[case] config: SyntheticConfig, #[case] expected: SyntheticError) {
        let err = preferential_attachment(&config).expect_err("config is degenerate");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn generation_is_reproducible() {
        let first = preferential_attachment(&config(200, 3)).expect("valid config");
        let second = preferential_attachment(&config(200, 3)).expect("valid config");
        let edges = |graph: &Graph| graph.edges().collect::<Vec<_>>();
        assert_eq!(edges(&first), edges(&second));
    }

    #[rstest]
    fn degree_scores_cover_every_vertex() {
        let graph = preferential_attachment(&config(30, 2)).expect("valid config");
        let scores = degree_scores(&graph);
        assert_eq!(scores.len(), 30);
        assert!(scores.iter().all(|&(_, degree)| degree >= 2.0));
    }
}
