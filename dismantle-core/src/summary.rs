//! Reduction of a finished record sequence to summary statistics.

use std::time::Duration;

use tracing::instrument;

use crate::{
    error::SentinelError,
    policy::simpson,
    record::{RemovalRecord, validate_sentinel},
};

/// Wall-clock split of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunTimings {
    /// Time spent inside the candidate producer.
    pub prediction_time: Duration,
    /// Remaining time of the run.
    pub dismantle_time: Duration,
}

/// Read-only summary of one run.
///
/// # Examples
/// ```
/// use dismantle_core::{RemovalRecord, RunSummary, RunTimings, StaticId};
///
/// let records = [
///     RemovalRecord::accepted(1, StaticId::new(4), 0.9, 0.6, 0.2),
///     RemovalRecord::accepted(2, StaticId::new(8), 0.8, 0.4, 0.3),
///     RemovalRecord::accepted(3, StaticId::new(1), 0.7, 0.2, 0.3),
///     RemovalRecord::sentinel(),
/// ];
/// let summary = RunSummary::aggregate(&records, RunTimings::default())?;
/// assert_eq!(summary.slcc_peak_at(), Some(2));
/// assert_eq!(summary.lcc_size_at_peak(), Some(0.4));
/// assert_eq!(summary.removal_count(), 3);
/// assert!(summary.early_stopped());
/// assert!((summary.auc() - 0.8).abs() < 1e-12);
/// # Ok::<(), dismantle_core::SentinelError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    peak_slcc: Option<RemovalRecord>,
    auc: f64,
    removal_count: usize,
    early_stopped: bool,
    timings: RunTimings,
}

impl RunSummary {
    /// Validates `records` and computes the summary.
    ///
    /// The sentinel is excluded from the peak, the AUC and the removal
    /// count; its presence sets [`early_stopped`](Self::early_stopped).
    ///
    /// # Errors
    /// Returns a [`SentinelError`] when the first record is a sentinel or a
    /// sentinel is followed by further records.
    #[instrument(name = "core.aggregate", err, skip(records, timings), fields(records = records.len()))]
    pub fn aggregate(records: &[RemovalRecord], timings: RunTimings) -> Result<Self, SentinelError> {
        validate_sentinel(records)?;
        let early_stopped = records.last().is_some_and(RemovalRecord::is_sentinel);
        let removals = &records[..records.len() - usize::from(early_stopped)];

        let mut peak_slcc: Option<RemovalRecord> = None;
        for record in removals {
            if peak_slcc.is_none_or(|peak| record.slcc_fraction > peak.slcc_fraction) {
                peak_slcc = Some(*record);
            }
        }
        let curve: Vec<f64> = removals.iter().map(|r| r.lcc_fraction).collect();

        Ok(Self {
            peak_slcc,
            auc: simpson(&curve),
            removal_count: removals.len(),
            early_stopped,
            timings,
        })
    }

    /// Record with the largest SLCC fraction; the first one on ties.
    #[must_use]
    pub fn peak_slcc(&self) -> Option<&RemovalRecord> {
        self.peak_slcc.as_ref()
    }

    /// Sequence index of the peak SLCC record.
    #[must_use]
    pub fn slcc_peak_at(&self) -> Option<i64> {
        self.peak_slcc.map(|peak| peak.sequence)
    }

    /// LCC fraction at the peak SLCC record.
    #[must_use]
    pub fn lcc_size_at_peak(&self) -> Option<f64> {
        self.peak_slcc.map(|peak| peak.lcc_fraction)
    }

    /// SLCC fraction at the peak SLCC record.
    #[must_use]
    pub fn slcc_size_at_peak(&self) -> Option<f64> {
        self.peak_slcc.map(|peak| peak.slcc_fraction)
    }

    /// Area under the robustness curve.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.auc
    }

    /// Number of accepted removals.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.removal_count
    }

    /// Returns `true` when the run ended on the early-stopping guard.
    #[must_use]
    pub fn early_stopped(&self) -> bool {
        self.early_stopped
    }

    /// Time spent inside the candidate producer.
    #[must_use]
    pub fn prediction_time(&self) -> Duration {
        self.timings.prediction_time
    }

    /// Remaining time of the run.
    #[must_use]
    pub fn dismantle_time(&self) -> Duration {
        self.timings.dismantle_time
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::graph::StaticId;

    fn record(sequence: usize, lcc: f64, slcc: f64) -> RemovalRecord {
        RemovalRecord::accepted(sequence, StaticId::new(sequence as u64), 1.0, lcc, slcc)
    }

    #[rstest]
    fn empty_sequence_has_no_peak() {
        let summary =
            RunSummary::aggregate(&[], RunTimings::default()).expect("empty input is valid");
        assert_eq!(summary.peak_slcc(), None);
        assert_eq!(summary.removal_count(), 0);
        assert_eq!(summary.auc(), 0.0);
    }

    #[rstest]
    fn peak_ties_keep_first_occurrence() {
        let records = [record(1, 0.8, 0.1), record(2, 0.5, 0.3), record(3, 0.3, 0.3)];
        let summary =
            RunSummary::aggregate(&records, RunTimings::default()).expect("records are valid");
        assert_eq!(summary.slcc_peak_at(), Some(2));
        assert_eq!(summary.slcc_size_at_peak(), Some(0.3));
    }

    #[rstest]
    fn leading_sentinel_is_rejected() {
        let records = [RemovalRecord::sentinel(), record(1, 0.5, 0.1)];
        let err = RunSummary::aggregate(&records, RunTimings::default())
            .expect_err("leading sentinel must fail");
        assert_eq!(err, SentinelError::Leading);
    }

    #[rstest]
    fn timings_pass_through() {
        let timings = RunTimings {
            prediction_time: Duration::from_millis(3),
            dismantle_time: Duration::from_millis(5),
        };
        let summary =
            RunSummary::aggregate(&[record(1, 0.5, 0.5)], timings).expect("records are valid");
        assert_eq!(summary.prediction_time(), Duration::from_millis(3));
        assert_eq!(summary.dismantle_time(), Duration::from_millis(5));
    }
}
