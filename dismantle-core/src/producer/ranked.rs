//! Producer over a precomputed candidate list.

use std::cmp::Ordering;

use super::{Candidate, CandidateProducer, RunSnapshot};
use crate::{
    builder::DismantleParams,
    error::ProducerError,
    graph::{Graph, StaticId},
};

/// Replays a fixed list of candidates in order, counting the engine's
/// answers.
///
/// # Examples
/// ```
/// use dismantle_core::{RankedCandidates, StaticId};
///
/// let producer = RankedCandidates::from_scores(
///     "degree",
///     [(StaticId::new(1), 0.2), (StaticId::new(2), 0.9), (StaticId::new(3), 0.2)],
/// );
/// let order: Vec<u64> = producer.candidates().iter().map(|c| c.vertex.get()).collect();
/// assert_eq!(order, vec![2, 1, 3]);
/// ```
#[derive(Clone, Debug)]
pub struct RankedCandidates {
    name: String,
    candidates: Vec<Candidate>,
    cursor: usize,
    accepted: usize,
    rejected: usize,
    cancellations: usize,
}

impl RankedCandidates {
    /// Replays `candidates` exactly in the given order.
    #[must_use]
    pub fn new(name: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            name: name.into(),
            candidates,
            cursor: 0,
            accepted: 0,
            rejected: 0,
            cancellations: 0,
        }
    }

    /// Orders `scores` by descending score. Equal scores keep their input
    /// order.
    #[must_use]
    pub fn from_scores<I>(name: impl Into<String>, scores: I) -> Self
    where
        I: IntoIterator<Item = (StaticId, f64)>,
    {
        let mut candidates: Vec<Candidate> = scores
            .into_iter()
            .map(|(vertex, score)| Candidate { vertex, score })
            .collect();
        candidates.sort_by(|a, b| descending(a.score, b.score));
        Self::new(name, candidates)
    }

    /// The full candidate list.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Candidates not yet proposed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.candidates.len().saturating_sub(self.cursor)
    }

    /// Number of proposals the engine accepted.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Number of proposals the engine rejected.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Number of cancellation signals received.
    #[must_use]
    pub fn cancellations(&self) -> usize {
        self.cancellations
    }
}

impl CandidateProducer for RankedCandidates {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self, _graph: &Graph, _params: &DismantleParams) -> Result<(), ProducerError> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self, _snapshot: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
        let candidate = self.candidates.get(self.cursor).copied();
        if candidate.is_some() {
            self.cursor += 1;
        }
        Ok(candidate)
    }

    fn feedback(&mut self, accepted: bool) {
        if accepted {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }

    fn cancel(&mut self) {
        self.cancellations += 1;
        self.cursor = self.candidates.len();
    }
}

/// Descending order with NaN scores sorted last.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn nan_scores_sort_last() {
        let producer = RankedCandidates::from_scores(
            "nan",
            [
                (StaticId::new(1), f64::NAN),
                (StaticId::new(2), 0.1),
                (StaticId::new(3), f64::NEG_INFINITY),
            ],
        );
        let order: Vec<u64> = producer
            .candidates()
            .iter()
            .map(|c| c.vertex.get())
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[rstest]
    fn cancel_ends_the_stream() {
        let mut producer = RankedCandidates::new("fixed", vec![Candidate::new(1_u64, 1.0)]);
        producer.cancel();
        assert_eq!(producer.remaining(), 0);
        assert_eq!(
            producer
                .next(&RunSnapshot::default())
                .expect("replay never fails"),
            None
        );
    }
}
