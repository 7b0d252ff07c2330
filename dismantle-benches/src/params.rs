//! Benchmark parameter types.

use std::fmt;

use dismantle_core::PolicyKind;

/// Parameters for a benchmark over one synthetic graph.
#[derive(Clone, Debug)]
pub struct GraphBenchParams {
    /// Number of vertices in the graph.
    pub vertex_count: usize,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.vertex_count)
    }
}

/// Parameters for a full dismantling run.
#[derive(Clone, Debug)]
pub struct RunBenchParams {
    /// Number of vertices in the graph.
    pub vertex_count: usize,
    /// Stopping policy under test.
    pub policy: PolicyKind,
}

impl fmt::Display for RunBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},policy={}", self.vertex_count, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_compact() {
        let run = RunBenchParams {
            vertex_count: 500,
            policy: PolicyKind::LccGated,
        };
        assert_eq!(run.to_string(), "n=500,policy=lcc_threshold");
        assert_eq!(GraphBenchParams { vertex_count: 9 }.to_string(), "n=9");
    }
}
