//! Shared test utilities for `dismantle-core`.

use dismantle_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{
    builder::DismantleParams,
    error::ProducerError,
    graph::{Graph, StaticId},
    producer::{Candidate, CandidateProducer, RunSnapshot},
};

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Path `1 - 2 - 3 - 4 - 5`.
#[must_use]
pub(crate) fn path5() -> Graph {
    Graph::from_edges("path", [(1_u64, 2_u64), (2, 3), (3, 4), (4, 5)])
}

/// Producer that replays a fixed script and records every handshake signal.
///
/// A `None` entry in the script makes `next` fail at that position.
#[derive(Debug, Default)]
pub(crate) struct Scripted {
    script: Vec<Option<Candidate>>,
    cursor: usize,
    pub(crate) started: usize,
    pub(crate) feedback: Vec<bool>,
    pub(crate) cancels: usize,
}

impl Scripted {
    /// Replays `vertices` with halving scores starting at one.
    #[must_use]
    pub(crate) fn of(vertices: &[u64]) -> Self {
        let mut score = 2.0;
        Self::from_script(
            vertices
                .iter()
                .map(|&v| {
                    score /= 2.0;
                    Some(Candidate::new(v, score))
                })
                .collect(),
        )
    }

    /// Replays an explicit script.
    #[must_use]
    pub(crate) fn from_script(script: Vec<Option<Candidate>>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Static ids of every proposal accepted so far, in order.
    #[must_use]
    pub(crate) fn accepted_vertices(&self) -> Vec<StaticId> {
        self.script
            .iter()
            .flatten()
            .zip(&self.feedback)
            .filter(|&(_, &accepted)| accepted)
            .map(|(candidate, _)| candidate.vertex)
            .collect()
    }
}

impl CandidateProducer for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn start(&mut self, _: &Graph, _: &DismantleParams) -> Result<(), ProducerError> {
        self.started += 1;
        Ok(())
    }

    fn next(&mut self, _: &RunSnapshot) -> Result<Option<Candidate>, ProducerError> {
        let Some(entry) = self.script.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        entry
            .map(Some)
            .ok_or_else(|| ProducerError::failed("scripted failure"))
    }

    fn feedback(&mut self, accepted: bool) {
        self.feedback.push(accepted);
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }
}
