//! Edge-list loading.

use std::{io::BufRead, path::Path};

use dismantle_core::{Graph, GraphBuilder, GraphError, GraphIdentity, StaticId};

use crate::{errors::EdgeListProviderError, lines::for_each_record, open};

/// Graph loaded from an edge list, with counts of the lines that were
/// dropped while building it.
///
/// Each data line holds `source target`, optionally followed by extra columns
/// (weights, timestamps) that are ignored. A line with a single id declares
/// an isolated vertex. A first line whose leading token is not a number is
/// treated as a column header.
///
/// # Examples
/// ```
/// use std::io::Cursor;
///
/// use dismantle_providers_edgelist::EdgeListProvider;
///
/// let raw = "source,target\n1,2\n2,3\n3,3\n2,1\n9\n";
/// let provider = EdgeListProvider::try_from_reader("demo", Cursor::new(raw))?;
/// assert_eq!(provider.graph().vertex_count(), 4);
/// assert_eq!(provider.graph().edge_count(), 2);
/// assert_eq!(provider.dropped_loops(), 1);
/// assert_eq!(provider.dropped_duplicates(), 1);
/// # Ok::<(), dismantle_providers_edgelist::EdgeListProviderError>(())
/// ```
#[derive(Debug)]
pub struct EdgeListProvider {
    graph: Graph,
    dropped_loops: usize,
    dropped_duplicates: usize,
}

impl EdgeListProvider {
    /// Reads an edge list from `reader`.
    ///
    /// # Errors
    /// Returns [`EdgeListProviderError`] when reading fails, a line is
    /// malformed, or the input holds no vertices.
    pub fn try_from_reader<R>(
        identity: impl Into<GraphIdentity>,
        reader: R,
    ) -> Result<Self, EdgeListProviderError>
    where
        R: BufRead,
    {
        let mut builder = GraphBuilder::new(identity);
        let mut dropped_loops = 0;
        let mut dropped_duplicates = 0;
        let mut first = true;
        for_each_record(reader, |line, content, tokens| {
            let is_header = first && tokens.first().is_some_and(|t| t.parse::<u64>().is_err());
            first = false;
            if is_header {
                return Ok(());
            }
            match tokens {
                [only] => {
                    match builder.add_vertex(parse_vertex(line, only)?) {
                        Ok(_) | Err(GraphError::DuplicateVertex { .. }) => {}
                        Err(other) => return Err(other.into()),
                    }
                }
                [source, target, ..] => {
                    let (a, b) = (parse_vertex(line, source)?, parse_vertex(line, target)?);
                    if !builder.add_edge(a, b) {
                        if a == b {
                            dropped_loops += 1;
                        } else {
                            dropped_duplicates += 1;
                        }
                    }
                }
                [] => {
                    return Err(EdgeListProviderError::MalformedLine {
                        line,
                        expected: "`source target`",
                        content: content.to_owned(),
                    });
                }
            }
            Ok(())
        })?;
        if builder.vertex_count() == 0 {
            return Err(EdgeListProviderError::EmptyInput);
        }
        Ok(Self {
            graph: builder.build(),
            dropped_loops,
            dropped_duplicates,
        })
    }

    /// Reads an edge list from `path`, decompressing `.gz` files.
    ///
    /// # Errors
    /// Returns [`EdgeListProviderError::Open`] when the file cannot be opened,
    /// and the errors of [`try_from_reader`](Self::try_from_reader) otherwise.
    pub fn try_from_path(
        identity: impl Into<GraphIdentity>,
        path: impl AsRef<Path>,
    ) -> Result<Self, EdgeListProviderError> {
        Self::try_from_reader(identity, open::open(path.as_ref())?)
    }

    /// The loaded graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Consumes the provider, returning the graph.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Number of self-loop lines that were dropped.
    #[must_use]
    pub fn dropped_loops(&self) -> usize {
        self.dropped_loops
    }

    /// Number of repeated edges that were dropped.
    #[must_use]
    pub fn dropped_duplicates(&self) -> usize {
        self.dropped_duplicates
    }
}

/// Derives a graph identity from a file name, dropping a `.gz` suffix and
/// the remaining extension.
///
/// # Examples
/// ```
/// use dismantle_providers_edgelist::identity_from_path;
///
/// assert_eq!(identity_from_path("data/karate.el.gz").as_str(), "karate");
/// assert_eq!(identity_from_path("power.csv").as_str(), "power");
/// ```
#[must_use]
pub fn identity_from_path(path: impl AsRef<Path>) -> GraphIdentity {
    let path = path.as_ref();
    let stem_source = if open::is_gzip(path) {
        path.file_stem().map(Path::new)
    } else {
        Some(path)
    };
    stem_source
        .and_then(Path::file_stem)
        .and_then(|stem| stem.to_str())
        .map_or_else(|| GraphIdentity::from("graph"), GraphIdentity::from)
}

fn parse_vertex(line: usize, token: &str) -> Result<StaticId, EdgeListProviderError> {
    token
        .parse::<u64>()
        .map(StaticId::new)
        .map_err(|_| EdgeListProviderError::InvalidVertex {
            line,
            token: token.to_owned(),
        })
}
