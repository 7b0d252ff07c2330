//! Ranking files: one `vertex score` pair per line.

use std::{collections::HashSet, io::BufRead, path::Path};

use dismantle_core::{RankedCandidates, StaticId, StaticScores};

use crate::{errors::EdgeListProviderError, lines::for_each_record, open};

/// Precomputed vertex scores read from a ranking file.
///
/// Higher scores are removed first. Scores may be any value `f64` parses,
/// including `NaN`, which ranks last.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use dismantle_core::CandidateProducer;
/// use dismantle_providers_edgelist::Ranking;
///
/// let ranking = Ranking::try_from_reader("degree", Cursor::new("1 0.5\n2 0.9\n3 0.1\n"))?;
/// assert_eq!(ranking.len(), 3);
/// let producer = ranking.into_producer();
/// assert_eq!(producer.name(), "degree");
/// assert_eq!(producer.candidates()[0].vertex.get(), 2);
/// # Ok::<(), dismantle_providers_edgelist::EdgeListProviderError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    name: String,
    scores: Vec<(StaticId, f64)>,
}

impl Ranking {
    /// Reads a ranking from `reader`, keeping file order.
    ///
    /// # Errors
    /// Returns [`EdgeListProviderError`] when a line is malformed, a vertex is
    /// listed twice, or the input holds no entries.
    pub fn try_from_reader<R>(name: impl Into<String>, reader: R) -> Result<Self, EdgeListProviderError>
    where
        R: BufRead,
    {
        let mut seen = HashSet::new();
        let mut scores = Vec::new();
        for_each_record(reader, |line, content, tokens| {
            let [vertex, score] = tokens else {
                return Err(EdgeListProviderError::MalformedLine {
                    line,
                    expected: "`vertex score`",
                    content: content.to_owned(),
                });
            };
            let vertex = vertex
                .parse::<u64>()
                .map(StaticId::new)
                .map_err(|_| EdgeListProviderError::InvalidVertex {
                    line,
                    token: (*vertex).to_owned(),
                })?;
            let score = score
                .parse::<f64>()
                .map_err(|_| EdgeListProviderError::InvalidScore {
                    line,
                    token: (*score).to_owned(),
                })?;
            if !seen.insert(vertex) {
                return Err(EdgeListProviderError::DuplicateRanking { line, vertex });
            }
            scores.push((vertex, score));
            Ok(())
        })?;
        if scores.is_empty() {
            return Err(EdgeListProviderError::EmptyInput);
        }
        Ok(Self {
            name: name.into(),
            scores,
        })
    }

    /// Reads a ranking from `path`, decompressing `.gz` files.
    ///
    /// # Errors
    /// Returns [`EdgeListProviderError::Open`] when the file cannot be opened,
    /// and the errors of [`try_from_reader`](Self::try_from_reader) otherwise.
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, EdgeListProviderError> {
        Self::try_from_reader(name, open::open(path.as_ref())?)
    }

    /// Name of the ranking.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scores in file order.
    #[must_use]
    pub fn scores(&self) -> &[(StaticId, f64)] {
        &self.scores
    }

    /// Number of ranked vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` when no vertex is ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Candidate producer proposing vertices by descending score; ties keep
    /// file order.
    #[must_use]
    pub fn into_producer(self) -> RankedCandidates {
        RankedCandidates::from_scores(self.name, self.scores)
    }

    /// Scorer for the bulk adapter. Vertices missing from the file rank last.
    #[must_use]
    pub fn into_scorer(self) -> StaticScores {
        StaticScores::new(self.name, self.scores)
    }
}
