//! One run's view of a [`CandidateProducer`].

use std::time::{Duration, Instant};

use tracing::debug;

use super::{Candidate, CandidateProducer, RunSnapshot};
use crate::{
    builder::DismantleParams,
    error::{DismantleError, ProducerError},
    graph::{Graph, GraphIdentity},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SessionState {
    Idle,
    AwaitingFeedback,
    Exhausted,
    Failed,
    Cancelled,
}

impl SessionState {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed | Self::Cancelled)
    }
}

/// Drives a producer through the ask/answer handshake for a single run.
///
/// The session rejects a second proposal before the first one was answered,
/// charges every call into the producer to the prediction clock, and delivers
/// [`CandidateProducer::cancel`] exactly once if it is dropped while the
/// producer is still live. Exhaustion and producer failure end the session
/// without cancellation.
///
/// # Examples
/// ```
/// use dismantle_core::{Candidate, Graph, ProducerSession, RankedCandidates, RunSnapshot};
///
/// let graph = Graph::from_edges("pair", [(1_u64, 2_u64)]);
/// let mut producer = RankedCandidates::new("fixed", vec![Candidate::new(1_u64, 0.5)]);
/// {
///     let mut session = ProducerSession::new(&mut producer, graph.identity().clone());
///     let first = session.next(&RunSnapshot::default()).expect("handshake holds");
///     assert_eq!(first, Some(Candidate::new(1_u64, 0.5)));
///     session.answer(true).expect("one answer per proposal");
/// }
/// // Dropping a live session cancels the producer.
/// assert_eq!(producer.cancellations(), 1);
/// assert_eq!(producer.accepted(), 1);
/// ```
#[derive(Debug)]
pub struct ProducerSession<'p, P: CandidateProducer + ?Sized> {
    producer: &'p mut P,
    graph: GraphIdentity,
    state: SessionState,
    step: usize,
    prediction_time: Duration,
}

impl<'p, P: CandidateProducer + ?Sized> ProducerSession<'p, P> {
    /// Wraps `producer` for a run over the graph named `graph`.
    pub fn new(producer: &'p mut P, graph: GraphIdentity) -> Self {
        Self {
            producer,
            graph,
            state: SessionState::Idle,
            step: 0,
            prediction_time: Duration::ZERO,
        }
    }

    /// Calls [`CandidateProducer::start`].
    ///
    /// # Errors
    /// Returns [`DismantleError::Producer`] when the producer fails to start.
    pub fn start(&mut self, graph: &Graph, params: &DismantleParams) -> Result<(), DismantleError> {
        let started = Instant::now();
        let outcome = self.producer.start(graph, params);
        self.prediction_time += started.elapsed();
        outcome.map_err(|error| self.fail(error))
    }

    /// Requests the next proposal.
    ///
    /// # Errors
    /// Returns [`DismantleError::HandshakeViolation`] when the previous
    /// proposal has not been answered or the session is over, and
    /// [`DismantleError::Producer`] when the producer fails.
    pub fn next(&mut self, snapshot: &RunSnapshot) -> Result<Option<Candidate>, DismantleError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::AwaitingFeedback => {
                return Err(self.violation("next requested before the last proposal was answered"));
            }
            _ => return Err(self.violation("next requested after the session ended")),
        }
        self.step += 1;
        let started = Instant::now();
        let outcome = self.producer.next(snapshot);
        self.prediction_time += started.elapsed();
        match outcome {
            Ok(Some(candidate)) => {
                self.state = SessionState::AwaitingFeedback;
                Ok(Some(candidate))
            }
            Ok(None) => {
                debug!(producer = self.producer.name(), step = self.step, "producer exhausted");
                self.state = SessionState::Exhausted;
                Ok(None)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    /// Answers the outstanding proposal.
    ///
    /// # Errors
    /// Returns [`DismantleError::HandshakeViolation`] when no proposal is
    /// outstanding.
    pub fn answer(&mut self, accepted: bool) -> Result<(), DismantleError> {
        if self.state != SessionState::AwaitingFeedback {
            return Err(self.violation("answer given without an outstanding proposal"));
        }
        let started = Instant::now();
        self.producer.feedback(accepted);
        self.prediction_time += started.elapsed();
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Delivers the cancellation signal unless the producer already finished.
    /// Later calls are no-ops.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        let started = Instant::now();
        self.producer.cancel();
        self.prediction_time += started.elapsed();
        self.state = SessionState::Cancelled;
    }

    /// Number of proposals requested so far.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Wall time spent inside the producer.
    #[must_use]
    pub fn prediction_time(&self) -> Duration {
        self.prediction_time
    }

    /// Name reported by the wrapped producer.
    #[must_use]
    pub fn producer_name(&self) -> &str {
        self.producer.name()
    }

    /// Returns `true` once the producer reported exhaustion.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Exhausted
    }

    fn fail(&mut self, error: ProducerError) -> DismantleError {
        self.state = SessionState::Failed;
        DismantleError::Producer {
            graph: self.graph.clone(),
            producer: self.producer.name().to_owned(),
            step: self.step,
            error,
        }
    }

    fn violation(&self, detail: &'static str) -> DismantleError {
        DismantleError::HandshakeViolation {
            graph: self.graph.clone(),
            step: self.step,
            detail,
        }
    }
}

impl<P: CandidateProducer + ?Sized> Drop for ProducerSession<'_, P> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{error::DismantleErrorCode, producer::RankedCandidates};

    #[fixture]
    fn producer() -> RankedCandidates {
        RankedCandidates::new(
            "fixed",
            vec![Candidate::new(1_u64, 0.9), Candidate::new(2_u64, 0.1)],
        )
    }

    struct Failing;

    impl CandidateProducer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn next(&mut self, _: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
            Err(ProducerError::failed("boom"))
        }

        fn cancel(&mut self) {
            panic!("a failed producer must not be cancelled");
        }
    }

    #[rstest]
    fn second_next_before_answer_is_a_violation(mut producer: RankedCandidates) {
        let mut session = ProducerSession::new(&mut producer, GraphIdentity::from("g"));
        session
            .next(&RunSnapshot::default())
            .expect("first proposal");
        let err = session
            .next(&RunSnapshot::default())
            .expect_err("must answer first");
        assert_eq!(err.code(), DismantleErrorCode::HandshakeViolation);
    }

    #[rstest]
    fn answer_without_proposal_is_a_violation(mut producer: RankedCandidates) {
        let mut session = ProducerSession::new(&mut producer, GraphIdentity::from("g"));
        let err = session.answer(true).expect_err("nothing to answer");
        assert_eq!(err.code(), DismantleErrorCode::HandshakeViolation);
    }

    #[rstest]
    fn exhaustion_is_terminal_without_cancel(mut producer: RankedCandidates) {
        {
            let mut session = ProducerSession::new(&mut producer, GraphIdentity::from("g"));
            while session
                .next(&RunSnapshot::default())
                .expect("proposals succeed")
                .is_some()
            {
                session.answer(false).expect("answer succeeds");
            }
            assert!(session.is_exhausted());
            assert_eq!(session.step(), 3);
        }
        assert_eq!(producer.cancellations(), 0);
        assert_eq!(producer.rejected(), 2);
    }

    #[rstest]
    fn cancel_is_delivered_once(mut producer: RankedCandidates) {
        {
            let mut session = ProducerSession::new(&mut producer, GraphIdentity::from("g"));
            session.cancel();
            session.cancel();
        }
        assert_eq!(producer.cancellations(), 1);
    }

    #[rstest]
    fn producer_failure_carries_context() {
        let mut failing = Failing;
        let mut session = ProducerSession::new(&mut failing, GraphIdentity::from("karate"));
        let err = session
            .next(&RunSnapshot::default())
            .expect_err("producer fails");
        assert_eq!(err.kind(), crate::error::ErrorKind::ProducerFailure);
        assert_eq!(err.graph().map(GraphIdentity::as_str), Some("karate"));
        assert!(matches!(err, DismantleError::Producer { step: 1, .. }));
    }
}
