//! Candidate producers and the handshake the engine drives them through.
//!
//! A producer proposes one vertex at a time. After every proposal the engine
//! answers through [`CandidateProducer::feedback`] before asking again, and it
//! calls [`CandidateProducer::cancel`] exactly once when it stops early.

pub(crate) mod ranked;
mod session;

use std::fmt;

pub use self::{ranked::RankedCandidates, session::ProducerSession};
use crate::{
    builder::DismantleParams,
    error::ProducerError,
    graph::{Graph, StaticId},
};

/// A proposed removal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Vertex to remove.
    pub vertex: StaticId,
    /// Score reported alongside the proposal; never used for ordering.
    pub score: f64,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(vertex: impl Into<StaticId>, score: f64) -> Self {
        Self {
            vertex: vertex.into(),
            score,
        }
    }
}

/// Derived signals a producer may read while proposing candidates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSnapshot {
    /// Number of proposals requested so far, including this one.
    pub step: usize,
    /// Number of accepted removals so far.
    pub accepted: usize,
    /// Current size of the largest component.
    pub lcc_size: usize,
    /// Current size of the second-largest component.
    pub slcc_size: usize,
    /// Vertex count at the start of the run.
    pub original_vertex_count: usize,
}

/// Source of removal candidates for one dismantling run.
///
/// # Examples
/// ```
/// use dismantle_core::{Candidate, CandidateProducer, ProducerError, RunSnapshot};
///
/// struct Countdown(u64);
///
/// impl CandidateProducer for Countdown {
///     fn name(&self) -> &str { "countdown" }
///     fn next(&mut self, _: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
///         if self.0 == 0 {
///             return Ok(None);
///         }
///         self.0 -= 1;
///         Ok(Some(Candidate::new(self.0, 1.0)))
///     }
/// }
///
/// let mut producer = Countdown(2);
/// let snapshot = RunSnapshot::default();
/// assert_eq!(producer.next(&snapshot).expect("ok").map(|c| c.vertex.get()), Some(1));
/// ```
pub trait CandidateProducer {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Prepares the producer for a run over `graph`.
    ///
    /// # Errors
    /// Returns a [`ProducerError`] when the ranking cannot be computed.
    fn start(&mut self, graph: &Graph, params: &DismantleParams) -> Result<(), ProducerError> {
        let _ = (graph, params);
        Ok(())
    }

    /// Proposes the next candidate, or `None` when exhausted.
    ///
    /// # Errors
    /// Returns a [`ProducerError`] when producing the candidate fails.
    fn next(&mut self, snapshot: &RunSnapshot) -> Result<Option<Candidate>, ProducerError>;

    /// Receives the engine's decision on the last proposal.
    fn feedback(&mut self, accepted: bool) {
        let _ = accepted;
    }

    /// Terminal signal delivered when the engine stops before exhaustion.
    fn cancel(&mut self) {}
}

impl<P: CandidateProducer + ?Sized> CandidateProducer for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start(&mut self, graph: &Graph, params: &DismantleParams) -> Result<(), ProducerError> {
        (**self).start(graph, params)
    }

    fn next(&mut self, snapshot: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
        (**self).next(snapshot)
    }

    fn feedback(&mut self, accepted: bool) {
        (**self).feedback(accepted);
    }

    fn cancel(&mut self) {
        (**self).cancel();
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.vertex, self.score)
    }
}
