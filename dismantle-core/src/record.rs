//! Removal records and the append-only log that holds them.

use std::{fmt, slice};

use crate::{error::SentinelError, graph::StaticId};

/// Sequence index reserved for the early-stopping sentinel.
pub const SENTINEL_SEQUENCE: i64 = -1;

/// One accepted removal, or the early-stopping sentinel.
///
/// Fractions are component sizes divided by the vertex count the run started
/// with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RemovalRecord {
    /// 1-based index among accepted removals; [`SENTINEL_SEQUENCE`] for the
    /// sentinel.
    pub sequence: i64,
    /// Removed vertex; `None` only for the sentinel.
    pub vertex: Option<StaticId>,
    /// Score reported by the producer.
    pub score: f64,
    /// Largest component size after the removal, as a fraction.
    pub lcc_fraction: f64,
    /// Second-largest component size after the removal, as a fraction.
    pub slcc_fraction: f64,
}

impl RemovalRecord {
    /// Builds the record of an accepted removal.
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::{RemovalRecord, StaticId};
    ///
    /// let record = RemovalRecord::accepted(1, StaticId::new(3), 0.9, 0.4, 0.4);
    /// assert_eq!(record.sequence, 1);
    /// assert!(!record.is_sentinel());
    /// ```
    #[must_use]
    pub fn accepted(
        sequence: usize,
        vertex: StaticId,
        score: f64,
        lcc_fraction: f64,
        slcc_fraction: f64,
    ) -> Self {
        Self {
            sequence: i64::try_from(sequence).unwrap_or(i64::MAX),
            vertex: Some(vertex),
            score,
            lcc_fraction,
            slcc_fraction,
        }
    }

    /// The record appended when early stopping fires.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self {
            sequence: SENTINEL_SEQUENCE,
            vertex: None,
            score: -1.0,
            lcc_fraction: -1.0,
            slcc_fraction: -1.0,
        }
    }

    /// Returns `true` for the early-stopping sentinel.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.sequence < 0
    }
}

impl fmt::Display for RemovalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vertex {
            Some(vertex) => write!(
                f,
                "({}, {vertex}, {}, {}, {})",
                self.sequence, self.score, self.lcc_fraction, self.slcc_fraction
            ),
            None => f.write_str("(-1, -1, -1, -1, -1)"),
        }
    }
}

/// Checks the sentinel placement rules over a finished record sequence.
///
/// # Errors
/// Returns [`SentinelError::Leading`] when the first record is a sentinel and
/// [`SentinelError::NotLast`] when a sentinel is followed by more records.
pub fn validate_sentinel(records: &[RemovalRecord]) -> Result<(), SentinelError> {
    if records.first().is_some_and(RemovalRecord::is_sentinel) {
        return Err(SentinelError::Leading);
    }
    let len = records.len();
    match records.iter().position(RemovalRecord::is_sentinel) {
        Some(position) if position + 1 != len => Err(SentinelError::NotLast { position, len }),
        _ => Ok(()),
    }
}

/// Append-only sequence of removal records for one run.
///
/// The log refuses a leading sentinel and refuses any record once a sentinel
/// closed it.
///
/// # Examples
/// ```
/// use dismantle_core::{RemovalLog, RemovalRecord, SentinelError, StaticId};
///
/// let mut log = RemovalLog::new();
/// assert_eq!(log.close_with_sentinel(), Err(SentinelError::Leading));
/// log.push(RemovalRecord::accepted(1, StaticId::new(7), 0.5, 0.6, 0.2))?;
/// log.close_with_sentinel()?;
/// assert!(log.is_early_stopped());
/// assert_eq!(log.removal_count(), 1);
/// assert_eq!(log.len(), 2);
/// # Ok::<(), SentinelError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemovalLog {
    records: Vec<RemovalRecord>,
    closed: bool,
}

impl RemovalLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Sentinels are routed through
    /// [`close_with_sentinel`](Self::close_with_sentinel).
    ///
    /// # Errors
    /// Returns [`SentinelError::Closed`] once the log has been closed and
    /// [`SentinelError::Leading`] for a sentinel on an empty log.
    pub fn push(&mut self, record: RemovalRecord) -> Result<(), SentinelError> {
        if record.is_sentinel() {
            return self.close_with_sentinel();
        }
        if self.closed {
            return Err(SentinelError::Closed);
        }
        self.records.push(record);
        Ok(())
    }

    /// Appends the early-stopping sentinel and closes the log.
    ///
    /// # Errors
    /// Returns [`SentinelError::Leading`] when no removal was recorded yet
    /// and [`SentinelError::Closed`] when the log is already closed.
    pub fn close_with_sentinel(&mut self) -> Result<(), SentinelError> {
        if self.closed {
            return Err(SentinelError::Closed);
        }
        if self.records.is_empty() {
            return Err(SentinelError::Leading);
        }
        self.records.push(RemovalRecord::sentinel());
        self.closed = true;
        Ok(())
    }

    /// Returns `true` when the log ends with the sentinel.
    #[must_use]
    pub fn is_early_stopped(&self) -> bool {
        self.closed
    }

    /// All records, including a trailing sentinel.
    #[must_use]
    pub fn as_slice(&self) -> &[RemovalRecord] {
        &self.records
    }

    /// Accepted removals, excluding the sentinel.
    #[must_use]
    pub fn removals(&self) -> &[RemovalRecord] {
        let end = self.records.len() - usize::from(self.closed);
        &self.records[..end]
    }

    /// Number of accepted removals.
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.removals().len()
    }

    /// Number of records, including a trailing sentinel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over all records.
    pub fn iter(&self) -> slice::Iter<'_, RemovalRecord> {
        self.records.iter()
    }

    /// Consumes the log, returning its records.
    #[must_use]
    pub fn into_vec(self) -> Vec<RemovalRecord> {
        self.records
    }
}

impl TryFrom<Vec<RemovalRecord>> for RemovalLog {
    type Error = SentinelError;

    fn try_from(records: Vec<RemovalRecord>) -> Result<Self, Self::Error> {
        validate_sentinel(&records)?;
        let closed = records.last().is_some_and(RemovalRecord::is_sentinel);
        Ok(Self { records, closed })
    }
}

impl<'a> IntoIterator for &'a RemovalLog {
    type Item = &'a RemovalRecord;
    type IntoIter = slice::Iter<'a, RemovalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
