use std::{io, path::PathBuf};

use dismantle_core::{GraphError, StaticId};
use thiserror::Error;

/// Errors raised while loading edge lists and ranking files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdgeListProviderError {
    /// The input file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Open {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Reading or decompressing the input failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A line did not have the expected number of columns.
    #[error("line {line}: expected {expected} but found `{content}`")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// Shape the line should have had.
        expected: &'static str,
        /// The offending line, trimmed.
        content: String,
    },
    /// A vertex token was not a non-negative integer.
    #[error("line {line}: `{token}` is not a valid vertex id")]
    InvalidVertex {
        /// One-based line number.
        line: usize,
        /// The rejected token.
        token: String,
    },
    /// A score token was not a floating-point number.
    #[error("line {line}: `{token}` is not a valid score")]
    InvalidScore {
        /// One-based line number.
        line: usize,
        /// The rejected token.
        token: String,
    },
    /// A ranking file listed the same vertex twice.
    #[error("line {line}: vertex {vertex} is ranked more than once")]
    DuplicateRanking {
        /// One-based line number of the repeat.
        line: usize,
        /// The repeated vertex.
        vertex: StaticId,
    },
    /// The input held no data lines.
    #[error("input contains no data lines")]
    EmptyInput,
    /// Building the graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
