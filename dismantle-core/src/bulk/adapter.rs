//! Delegation of non-adaptive runs to a [`BulkDismantler`].
//!
//! The adapter ranks every vertex once, leases the translated edge list from a
//! [`TranslationStore`], and maps the engine's steps back to removal records.

use std::{
    collections::HashMap,
    ops::Deref,
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::{debug, error, info, instrument, warn};

use super::{BulkDismantler, BulkStep, EdgeListGraph, TranslationStore};
use crate::{
    Result,
    builder::StopCondition,
    engine::DismantleRun,
    error::{BulkEngineError, DismantleError, ProducerError},
    graph::{Graph, GraphIdentity, StaticId},
    policy::{RobustnessAuc, StopReason},
    producer::ranked::descending,
    record::{RemovalLog, RemovalRecord},
};

/// Scores every vertex of a graph in one call.
pub trait VertexScorer {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns one score per vertex, indexed by dynamic id. Higher scores
    /// are removed first.
    ///
    /// # Errors
    /// Returns a [`ProducerError`] when scoring fails.
    fn score(&mut self, graph: &Graph) -> core::result::Result<Vec<f64>, ProducerError>;
}

/// Precomputed scores keyed by static id.
///
/// Vertices without a score rank last.
///
/// # Examples
/// ```
/// use dismantle_core::{Graph, StaticId, StaticScores, VertexScorer};
///
/// let graph = Graph::from_edges("pair", [(1_u64, 2_u64)]);
/// let mut scores = StaticScores::new("file", [(StaticId::new(2), 0.7)]);
/// let scored = scores.score(&graph).expect("static scores never fail");
/// assert_eq!(scored, vec![f64::NEG_INFINITY, 0.7]);
/// ```
#[derive(Clone, Debug)]
pub struct StaticScores {
    name: String,
    scores: HashMap<StaticId, f64>,
}

impl StaticScores {
    /// Collects `scores`; later entries overwrite earlier ones.
    #[must_use]
    pub fn new<I>(name: impl Into<String>, scores: I) -> Self
    where
        I: IntoIterator<Item = (StaticId, f64)>,
    {
        Self {
            name: name.into(),
            scores: scores.into_iter().collect(),
        }
    }

    /// Number of scored vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` when no vertex is scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl VertexScorer for StaticScores {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&mut self, graph: &Graph) -> core::result::Result<Vec<f64>, ProducerError> {
        Ok(graph
            .vertices()
            .map(|(_, id)| self.scores.get(&id).copied().unwrap_or(f64::NEG_INFINITY))
            .collect())
    }
}

/// Holds a translated edge list for the duration of one engine call.
struct Lease {
    graph: Arc<EdgeListGraph>,
}

impl Deref for Lease {
    type Target = EdgeListGraph;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        debug!(graph = %self.graph.identity(), "translated edge list released");
    }
}

/// Runs a [`BulkDismantler`] over a single global ranking.
///
/// # Examples
/// ```
/// use dismantle_core::{
///     ExternalDismantler, Graph, StaticId, StaticScores, StopCondition, ThresholdBulkEngine,
///     TranslationCache,
/// };
///
/// let graph = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
/// let mut scores = StaticScores::new(
///     "degree",
///     [(2, 2.0), (3, 2.0), (4, 2.0), (1, 1.0), (5, 1.0)].map(|(v, s)| (StaticId::new(v), s)),
/// );
/// let adapter = ExternalDismantler::new(ThresholdBulkEngine, StopCondition::Absolute(2))
///     .expect("stop condition is valid");
/// let mut cache = TranslationCache::default();
///
/// let run = adapter.run(&graph, &mut scores, &mut cache).expect("engine succeeds");
/// let removed: Vec<u64> = run
///     .records
///     .iter()
///     .filter_map(|r| r.vertex.map(|v| v.get()))
///     .collect();
/// // Ties keep vertex order: 2 goes first, then 3 leaves {1} and {4, 5}.
/// assert_eq!(removed, vec![2, 3]);
/// assert!(cache.contains(graph.identity()));
/// ```
#[derive(Clone, Debug)]
pub struct ExternalDismantler<E> {
    engine: E,
    stop_condition: StopCondition,
}

impl<E: BulkDismantler> ExternalDismantler<E> {
    /// Wraps `engine` with the stop condition to apply.
    ///
    /// # Errors
    /// Returns [`DismantleError::InvalidStopFraction`] when a fractional stop
    /// condition is outside `[0, 1]`.
    pub fn new(engine: E, stop_condition: StopCondition) -> Result<Self> {
        if let StopCondition::Fraction(fraction) = stop_condition
            && !(0.0..=1.0).contains(&fraction)
        {
            return Err(DismantleError::InvalidStopFraction { got: fraction });
        }
        Ok(Self {
            engine,
            stop_condition,
        })
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Ranks the vertices of `graph` with `scorer` and dismantles it in one
    /// engine call. The translation is leased from `cache` and released on
    /// every path.
    ///
    /// # Errors
    /// Returns [`DismantleError::Producer`] when scoring fails or yields the
    /// wrong number of scores, and [`DismantleError::ExternalEngine`] when
    /// the cache or the engine fails.
    #[instrument(
        name = "core.run_static",
        err,
        skip(self, graph, scorer, cache),
        fields(
            graph = %graph.identity(),
            vertices = graph.vertex_count(),
            engine = self.engine.name(),
            scorer = scorer.name(),
        ),
    )]
    pub fn run<S, C>(&self, graph: &Graph, scorer: &mut S, mut cache: C) -> Result<DismantleRun>
    where
        S: VertexScorer + ?Sized,
        C: TranslationStore,
    {
        let started = Instant::now();
        let identity = graph.identity().clone();
        let original = graph.vertex_count();
        let stop_condition = self.stop_condition.resolve(original);
        if original == 0 {
            warn!(graph = %identity, "graph has no vertices, returning an empty run");
            return Ok(self.finish(
                identity,
                RemovalLog::new(),
                (Duration::ZERO, started.elapsed()),
                StopReason::EmptyGraph,
                (0.0, stop_condition, 0),
            ));
        }

        let predicted = Instant::now();
        let scores = scorer.score(graph).map_err(|error| DismantleError::Producer {
            graph: identity.clone(),
            producer: scorer.name().to_owned(),
            step: 0,
            error,
        })?;
        if scores.len() != original {
            return Err(DismantleError::Producer {
                graph: identity,
                producer: scorer.name().to_owned(),
                step: 0,
                error: ProducerError::ScoreCountMismatch {
                    expected: original,
                    got: scores.len(),
                },
            });
        }
        let (order, by_vertex) = rank(graph, &scores);
        let prediction_time = predicted.elapsed();

        let steps = {
            let lease = Lease {
                graph: cache
                    .checkout(graph)
                    .map_err(|error| self.engine_failure(&identity, error))?,
            };
            self.engine
                .dismantle(&lease, &order, stop_condition)
                .map_err(|error| self.engine_failure(&identity, error))?
        };

        let (log, auc) = self.to_records(&identity, &steps, &by_vertex, original)?;
        let stop_reason = match steps.last() {
            Some(step) if step.lcc_size <= stop_condition => StopReason::Dismantled,
            _ => StopReason::ProducerExhausted,
        };
        let dismantle_time = started.elapsed().saturating_sub(prediction_time);
        info!(
            graph = %identity,
            removals = log.removal_count(),
            reason = %stop_reason,
            auc,
            "bulk dismantling finished"
        );
        Ok(self.finish(
            identity,
            log,
            (prediction_time, dismantle_time),
            stop_reason,
            (auc, stop_condition, original),
        ))
    }

    #[allow(clippy::cast_precision_loss, reason = "vertex counts fit in f64 mantissa")]
    fn to_records(
        &self,
        identity: &GraphIdentity,
        steps: &[BulkStep],
        by_vertex: &HashMap<StaticId, f64>,
        original: usize,
    ) -> Result<(RemovalLog, f64)> {
        let total = original as f64;
        let mut log = RemovalLog::new();
        let mut auc = RobustnessAuc::new();
        for (i, step) in steps.iter().enumerate() {
            let score = *by_vertex.get(&step.vertex).ok_or_else(|| {
                self.engine_failure(identity, BulkEngineError::UnknownVertex { vertex: step.vertex })
            })?;
            let lcc_fraction = step.lcc_size as f64 / total;
            auc.push(lcc_fraction);
            log.push(RemovalRecord::accepted(
                i + 1,
                step.vertex,
                score,
                lcc_fraction,
                step.slcc_size as f64 / total,
            ))
            .map_err(|error| DismantleError::Sentinel {
                graph: identity.clone(),
                error,
            })?;
        }
        Ok((log, auc.value()))
    }

    fn engine_failure(&self, identity: &GraphIdentity, error: BulkEngineError) -> DismantleError {
        error!(
            graph = %identity,
            engine = self.engine.name(),
            code = %error.code(),
            "bulk engine failed: {error}"
        );
        DismantleError::ExternalEngine {
            graph: identity.clone(),
            engine: self.engine.name().to_owned(),
            error,
        }
    }

    fn finish(
        &self,
        graph: GraphIdentity,
        records: RemovalLog,
        (prediction_time, dismantle_time): (Duration, Duration),
        stop_reason: StopReason,
        (final_auc, stop_condition, original_vertex_count): (f64, usize, usize),
    ) -> DismantleRun {
        DismantleRun {
            graph,
            policy: self.engine.policy(),
            records,
            prediction_time,
            dismantle_time,
            stop_reason,
            final_auc,
            stop_condition,
            original_vertex_count,
        }
    }
}

/// Orders vertices by descending score; ties keep slot order.
fn rank(graph: &Graph, scores: &[f64]) -> (Vec<StaticId>, HashMap<StaticId, f64>) {
    let mut ranked: Vec<(StaticId, f64)> = graph
        .vertices()
        .map(|(_, id)| id)
        .zip(scores.iter().copied())
        .collect();
    ranked.sort_by(|a, b| descending(a.1, b.1));
    let order = ranked.iter().map(|&(id, _)| id).collect();
    (order, ranked.into_iter().collect())
}
