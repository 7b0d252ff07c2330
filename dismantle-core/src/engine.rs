//! Sequential dismantling engine.
//!
//! Provides the [`Dismantler`] entry point that drives a candidate producer
//! against a graph under one stopping policy.

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::{
    Result,
    builder::{DismantleParams, StopCondition},
    connectivity::Components,
    error::DismantleError,
    graph::{DynamicId, Graph, GraphIdentity, StaticId},
    kcore::CoreNumbers,
    policy::{PolicyKind, StopReason, StoppingPolicy},
    producer::{CandidateProducer, ProducerSession, RunSnapshot},
    record::{RemovalLog, RemovalRecord},
    summary::{RunSummary, RunTimings},
    telemetry,
};

/// Outcome of one dismantling run.
#[derive(Clone, Debug, PartialEq)]
pub struct DismantleRun {
    /// Identity of the dismantled graph.
    pub graph: GraphIdentity,
    /// Policy the run used.
    pub policy: PolicyKind,
    /// Accepted removals, possibly closed by the early-stopping sentinel.
    pub records: RemovalLog,
    /// Wall time spent inside the producer.
    pub prediction_time: Duration,
    /// Remaining wall time of the run.
    pub dismantle_time: Duration,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Running AUC at the end of the run.
    pub final_auc: f64,
    /// Resolved stop condition.
    pub stop_condition: usize,
    /// Vertex count at the start of the run.
    pub original_vertex_count: usize,
}

impl DismantleRun {
    /// Reduces the run to its summary statistics.
    ///
    /// # Errors
    /// Returns [`DismantleError::Sentinel`] when the records break the
    /// sentinel placement rules.
    pub fn summary(&self) -> Result<RunSummary> {
        RunSummary::aggregate(
            self.records.as_slice(),
            RunTimings {
                prediction_time: self.prediction_time,
                dismantle_time: self.dismantle_time,
            },
        )
        .map_err(|error| DismantleError::Sentinel {
            graph: self.graph.clone(),
            error,
        })
    }
}

/// Entry point for running a dismantling simulation.
///
/// # Examples
/// ```
/// use dismantle_core::{
///     Candidate, DismantlerBuilder, Graph, RankedCandidates, StopCondition, StopReason,
/// };
///
/// let mut graph = Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)]);
/// let mut producer = RankedCandidates::new("fixed", vec![Candidate::new(3_u64, 0.9)]);
/// let dismantler = DismantlerBuilder::new()
///     .with_stop_condition(StopCondition::Absolute(2))
///     .build()
///     .expect("configuration is valid");
///
/// let run = dismantler.run(&mut graph, &mut producer).expect("run succeeds");
/// assert_eq!(run.stop_reason, StopReason::Dismantled);
/// let records = run.records.as_slice();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].vertex.map(|v| v.get()), Some(3));
/// assert_eq!((records[0].lcc_fraction, records[0].slcc_fraction), (0.4, 0.4));
/// ```
#[derive(Clone, Debug)]
pub struct Dismantler {
    policy: PolicyKind,
    stop_condition: StopCondition,
    early_stopping_auc: Option<f64>,
    early_stopping_min_removals: Option<usize>,
}

impl Dismantler {
    pub(crate) fn new(
        policy: PolicyKind,
        stop_condition: StopCondition,
        early_stopping_auc: Option<f64>,
        early_stopping_min_removals: Option<usize>,
    ) -> Self {
        Self {
            policy,
            stop_condition,
            early_stopping_auc,
            early_stopping_min_removals,
        }
    }

    /// Returns the configured policy.
    #[must_use]
    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    /// Returns the configured stop condition.
    #[must_use]
    pub fn stop_condition(&self) -> StopCondition {
        self.stop_condition
    }

    /// Returns the early-stopping AUC ceiling.
    #[must_use]
    pub fn early_stopping_auc(&self) -> Option<f64> {
        self.early_stopping_auc
    }

    /// Returns the early-stopping minimum removal count.
    #[must_use]
    pub fn early_stopping_min_removals(&self) -> Option<usize> {
        self.early_stopping_min_removals
    }

    /// Resolves the per-run parameters for `graph`.
    #[must_use]
    pub fn params_for(&self, graph: &Graph) -> DismantleParams {
        DismantleParams {
            policy: self.policy,
            stop_condition: self.stop_condition.resolve(graph.vertex_count()),
            early_stopping_auc: self.early_stopping_auc,
            early_stopping_min_removals: self.early_stopping_min_removals,
        }
    }

    /// Dismantles `graph` with candidates from `producer`.
    ///
    /// Vertices are cleared rather than deleted, so the graph keeps its
    /// vertex count and every static id stays resolvable.
    ///
    /// # Errors
    /// Returns [`DismantleError::Producer`] when the producer fails,
    /// [`DismantleError::UnknownVertex`] or [`DismantleError::IdMismatch`]
    /// when a proposal cannot be resolved, and
    /// [`DismantleError::EmptyCandidateStream`] when the peak policy receives
    /// no candidates at all.
    pub fn run<P>(&self, graph: &mut Graph, producer: &mut P) -> Result<DismantleRun>
    where
        P: CandidateProducer + ?Sized,
    {
        let params = self.params_for(graph);
        self.run_with_params(graph, producer, params)
    }

    #[instrument(
        name = "core.run",
        err,
        skip(self, graph, producer, params),
        fields(
            graph = %graph.identity(),
            vertices = graph.vertex_count(),
            producer = %producer.name(),
            policy = %params.policy,
            stop_condition = params.stop_condition,
        ),
    )]
    fn run_with_params<P>(
        &self,
        graph: &mut Graph,
        producer: &mut P,
        params: DismantleParams,
    ) -> Result<DismantleRun>
    where
        P: CandidateProducer + ?Sized,
    {
        let started = Instant::now();
        let identity = graph.identity().clone();
        let original = graph.vertex_count();
        if original == 0 {
            warn!(graph = %identity, "graph has no vertices, returning an empty run");
            return Ok(DismantleRun {
                graph: identity,
                policy: params.policy,
                records: RemovalLog::new(),
                prediction_time: Duration::ZERO,
                dismantle_time: started.elapsed(),
                stop_reason: StopReason::EmptyGraph,
                final_auc: 0.0,
                stop_condition: params.stop_condition,
                original_vertex_count: 0,
            });
        }

        let mut session = ProducerSession::new(producer, identity.clone());
        session.start(graph, &params)?;

        let mut components = Components::measure(graph);
        let mut cores = params
            .policy
            .needs_core_numbers()
            .then(|| CoreNumbers::compute(graph));
        let mut policy = StoppingPolicy::new(&params, &components);
        let mut log = RemovalLog::new();

        let stop_reason = loop {
            if let Some(reason) = policy.gate(cores.as_ref()) {
                session.cancel();
                break reason;
            }

            let snapshot = RunSnapshot {
                step: session.step() + 1,
                accepted: log.removal_count(),
                lcc_size: policy.lcc_size(),
                slcc_size: policy.slcc_size(),
                original_vertex_count: original,
            };
            let Some(candidate) = session.next(&snapshot)? else {
                if session.step() == 1 && params.policy.requires_first_step() {
                    return Err(DismantleError::EmptyCandidateStream {
                        graph: identity,
                        policy: params.policy,
                    });
                }
                policy.finish(StopReason::ProducerExhausted);
                break StopReason::ProducerExhausted;
            };

            let step = session.step();
            let vertex = resolve(graph, &identity, candidate.vertex, step)?;
            let accepted = policy.accepts(vertex, &components, cores.as_ref());
            session.answer(accepted)?;

            if accepted {
                graph
                    .clear_vertex(vertex)
                    .map_err(|error| DismantleError::Graph {
                        graph: identity.clone(),
                        error,
                    })?;
                let measured = Instant::now();
                components = Components::measure(graph);
                if let Some(cores) = cores.as_mut() {
                    *cores = CoreNumbers::compute(graph);
                }
                telemetry::record_connectivity_latency(measured.elapsed());

                let (lcc_fraction, slcc_fraction) = policy.observe(&components, original);
                let sequence = log.removal_count() + 1;
                log.push(RemovalRecord::accepted(
                    sequence,
                    candidate.vertex,
                    candidate.score,
                    lcc_fraction,
                    slcc_fraction,
                ))
                .map_err(|error| DismantleError::Sentinel {
                    graph: identity.clone(),
                    error,
                })?;
                telemetry::record_accepted();
                debug!(
                    step,
                    sequence,
                    vertex = %candidate.vertex,
                    lcc_fraction,
                    slcc_fraction,
                    "candidate accepted"
                );
            } else {
                telemetry::record_rejected();
                debug!(step, vertex = %candidate.vertex, "candidate rejected");
            }

            if let Some(reason) = policy.should_stop() {
                session.cancel();
                break reason;
            }
            if let Some(reason) = policy.early_stop(log.removal_count()) {
                log.close_with_sentinel()
                    .map_err(|error| DismantleError::Sentinel {
                        graph: identity.clone(),
                        error,
                    })?;
                telemetry::record_early_stop();
                session.cancel();
                break reason;
            }
        };

        let prediction_time = session.prediction_time();
        drop(session);
        let dismantle_time = started.elapsed().saturating_sub(prediction_time);
        info!(
            graph = %identity,
            removals = log.removal_count(),
            reason = %stop_reason,
            auc = policy.auc(),
            "dismantling finished"
        );
        Ok(DismantleRun {
            graph: identity,
            policy: params.policy,
            records: log,
            prediction_time,
            dismantle_time,
            stop_reason,
            final_auc: policy.auc(),
            stop_condition: params.stop_condition,
            original_vertex_count: original,
        })
    }
}

fn resolve(
    graph: &Graph,
    identity: &GraphIdentity,
    vertex: StaticId,
    step: usize,
) -> Result<DynamicId> {
    let dynamic = graph
        .dynamic_id(vertex)
        .ok_or_else(|| DismantleError::UnknownVertex {
            graph: identity.clone(),
            step,
            vertex,
        })?;
    match graph.static_id(dynamic) {
        Some(found) if found == vertex => Ok(dynamic),
        found => Err(DismantleError::IdMismatch {
            graph: identity.clone(),
            vertex,
            index: dynamic.index(),
            found: found.unwrap_or(vertex),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        builder::DismantlerBuilder,
        error::DismantleErrorCode,
        producer::Candidate,
        test_utils::{Scripted, path5},
    };

    fn dismantler(policy: PolicyKind, stop: usize) -> Dismantler {
        DismantlerBuilder::new()
            .with_policy(policy)
            .with_stop_condition(StopCondition::Absolute(stop))
            .build()
            .expect("configuration is valid")
    }

    fn removed(run: &DismantleRun) -> Vec<u64> {
        run.records
            .removals()
            .iter()
            .filter_map(|r| r.vertex.map(StaticId::get))
            .collect()
    }

    #[rstest]
    fn stops_once_lcc_reaches_condition() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[3, 1, 2]);
        let run = dismantler(PolicyKind::Threshold, 2)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(run.stop_reason, StopReason::Dismantled);
        assert_eq!(removed(&run), vec![3]);
        assert_eq!(producer.feedback, vec![true]);
        assert_eq!(producer.cancels, 1);
        // Cleared vertices keep their slots.
        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.edge_count(), 2);
    }

    #[rstest]
    fn lcc_gate_rejects_outside_vertices() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[3, 4, 5, 1, 2, 4]);
        let run = dismantler(PolicyKind::LccGated, 1)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(removed(&run), vec![3, 1, 4]);
        assert_eq!(producer.feedback, vec![true, false, false, true, false, true]);
        let sequences: Vec<i64> = run.records.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(run.stop_reason, StopReason::Dismantled);
    }

    #[rstest]
    fn peak_policy_stops_when_slcc_catches_up() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[2, 4, 1]);
        let run = dismantler(PolicyKind::PeakSlcc, 0)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(run.stop_reason, StopReason::SlccPeak);
        assert_eq!(removed(&run), vec![2, 4]);
    }

    #[rstest]
    fn kcore_policy_stops_when_two_core_is_gone() {
        let mut graph = Graph::from_edges("kite", [(1_u64, 2_u64), (2, 3), (3, 1), (3, 4)]);
        let mut producer = Scripted::of(&[4, 1, 2]);
        let run = dismantler(PolicyKind::KCoreGated, 0)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(run.stop_reason, StopReason::TwoCoreExhausted);
        assert_eq!(removed(&run), vec![1]);
        assert_eq!(producer.feedback, vec![false, true]);
        assert_eq!(producer.cancels, 1);
    }

    #[rstest]
    fn early_stopping_appends_sentinel() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[3, 1, 2, 4]);
        let run = DismantlerBuilder::new()
            .with_stop_condition(StopCondition::Absolute(0))
            .with_early_stopping(0.1, 1)
            .build()
            .expect("configuration is valid")
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(run.stop_reason, StopReason::EarlyStopped);
        assert!(run.records.is_early_stopped());
        assert_eq!(run.records.len(), 3);
        assert_eq!(removed(&run), vec![3, 1]);
        assert_eq!(producer.cancels, 1);
        let summary = run.summary().expect("sentinel is last");
        assert!(summary.early_stopped());
        assert_eq!(summary.removal_count(), 2);
    }

    #[rstest]
    fn exhaustion_does_not_cancel() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[1]);
        let run = dismantler(PolicyKind::Threshold, 0)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        assert_eq!(run.stop_reason, StopReason::ProducerExhausted);
        assert_eq!(producer.cancels, 0);
    }

    #[rstest]
    #[case(PolicyKind::Threshold, None)]
    #[case(PolicyKind::LccGated, None)]
    #[case(PolicyKind::PeakSlcc, Some(DismantleErrorCode::EmptyCandidateStream))]
    fn empty_stream_is_only_fatal_for_peak(
        #[case] policy: PolicyKind,
        #[case] expected: Option<DismantleErrorCode>,
    ) {
        let mut graph = path5();
        let result = dismantler(policy, 0).run(&mut graph, &mut Scripted::of(&[]));
        match expected {
            None => {
                let run = result.expect("empty stream is tolerated");
                assert!(run.records.is_empty());
                assert_eq!(run.final_auc, 0.0);
            }
            Some(code) => assert_eq!(result.expect_err("empty stream").code(), code),
        }
    }

    #[rstest]
    fn producer_failure_aborts_without_cancel() {
        let mut graph = path5();
        let mut producer = Scripted::from_script(vec![Some(Candidate::new(3_u64, 1.0)), None]);
        let err = dismantler(PolicyKind::Threshold, 0)
            .run(&mut graph, &mut producer)
            .expect_err("producer fails");
        assert!(matches!(err, DismantleError::Producer { step: 2, .. }));
        assert_eq!(producer.cancels, 0);
    }

    #[rstest]
    fn unknown_vertex_cancels_the_producer() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[42]);
        let err = dismantler(PolicyKind::Threshold, 0)
            .run(&mut graph, &mut producer)
            .expect_err("vertex is unknown");
        assert_eq!(
            err,
            DismantleError::UnknownVertex {
                graph: GraphIdentity::from("path"),
                step: 1,
                vertex: StaticId::new(42),
            }
        );
        assert_eq!(producer.cancels, 1);
    }

    #[rstest]
    fn empty_graph_never_starts_the_producer() {
        let mut graph = crate::graph::GraphBuilder::new("empty").build();
        let mut producer = Scripted::of(&[1]);
        let run = dismantler(PolicyKind::PeakSlcc, 0)
            .run(&mut graph, &mut producer)
            .expect("empty graph is not an error");
        assert_eq!(run.stop_reason, StopReason::EmptyGraph);
        assert_eq!(producer.started, 0);
    }

    #[rstest]
    fn records_carry_producer_scores() {
        let mut graph = path5();
        let mut producer = Scripted::of(&[2, 4]);
        let run = dismantler(PolicyKind::Threshold, 1)
            .run(&mut graph, &mut producer)
            .expect("run succeeds");
        let scores: Vec<f64> = run.records.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.0, 0.5]);
        assert_eq!(producer.accepted_vertices(), vec![StaticId::new(2), StaticId::new(4)]);
    }
}
