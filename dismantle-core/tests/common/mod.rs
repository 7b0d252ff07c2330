#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex};

use dismantle_core::{
    Candidate, CandidateProducer, Graph, ProducerError, RunSnapshot, StaticId,
};

/// Signals a [`Recorder`] has seen, shared with the test body.
#[derive(Debug, Default)]
pub struct Journal {
    pub feedback: Vec<bool>,
    pub cancels: usize,
}

/// Replays a fixed order and records the handshake in a shared journal.
#[derive(Clone, Debug)]
pub struct Recorder {
    order: Vec<StaticId>,
    cursor: usize,
    fail_at: Option<usize>,
    pub journal: Arc<Mutex<Journal>>,
}

impl Recorder {
    #[must_use]
    pub fn new(order: impl IntoIterator<Item = u64>) -> Self {
        Self {
            order: order.into_iter().map(StaticId::new).collect(),
            cursor: 0,
            fail_at: None,
            journal: Arc::default(),
        }
    }

    /// Fails instead of proposing the `step`-th candidate (1-based).
    #[must_use]
    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at = Some(step);
        self
    }

    #[must_use]
    pub fn cancels(&self) -> usize {
        self.journal.lock().expect("journal lock").cancels
    }

    #[must_use]
    pub fn feedback(&self) -> Vec<bool> {
        self.journal.lock().expect("journal lock").feedback.clone()
    }
}

impl CandidateProducer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn next(&mut self, snapshot: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
        if self.fail_at == Some(snapshot.step) {
            return Err(ProducerError::failed("model crashed"));
        }
        let Some(&vertex) = self.order.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        Ok(Some(Candidate::new(vertex, 1.0)))
    }

    fn feedback(&mut self, accepted: bool) {
        self.journal.lock().expect("journal lock").feedback.push(accepted);
    }

    fn cancel(&mut self) {
        self.journal.lock().expect("journal lock").cancels += 1;
    }
}

/// Path `1 - 2 - 3 - 4 - 5`.
#[must_use]
pub fn path5() -> Graph {
    Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)])
}

/// Two triangles joined by the bridge `3 - 4`.
#[must_use]
pub fn barbell() -> Graph {
    Graph::from_edges(
        "barbell",
        [(1_u64, 2_u64), (2, 3), (3, 1), (3, 4), (4, 5), (5, 6), (6, 4)],
    )
}

/// Static ids of `graph` ordered by descending degree; ties keep slot order.
#[must_use]
pub fn degree_order(graph: &Graph) -> Vec<u64> {
    let mut ranked: Vec<(u64, usize)> = graph
        .vertices()
        .map(|(slot, id)| (id.get(), graph.degree(slot)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().map(|(id, _)| id).collect()
}
