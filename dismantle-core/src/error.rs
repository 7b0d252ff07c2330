//! Error types for the dismantling engine.
//!
//! Every public error carries a stable machine-readable code, and
//! [`DismantleError::kind`] sorts failures into the handful of categories
//! callers act on (configuration, producer, invariant, external engine).

use std::fmt;

use thiserror::Error;

use crate::{
    graph::{GraphIdentity, StaticId},
    policy::PolicyKind,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Errors raised while building or editing a [`crate::Graph`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// The static id was already assigned to another vertex.
    #[error("vertex {vertex} was added twice")]
    DuplicateVertex {
        /// Offending static id.
        vertex: StaticId,
    },
    /// No vertex carries the static id.
    #[error("vertex {vertex} is not part of the graph")]
    UnknownVertex {
        /// Static id that could not be resolved.
        vertex: StaticId,
    },
    /// A dynamic index pointed past the end of the vertex table.
    #[error("dynamic index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// The index supplied by the caller.
        index: usize,
        /// Number of vertices currently in the graph.
        vertex_count: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// The static id was already assigned to another vertex.
        DuplicateVertex => DuplicateVertex { .. } => "GRAPH_DUPLICATE_VERTEX",
        /// No vertex carries the static id.
        UnknownVertex => UnknownVertex { .. } => "GRAPH_UNKNOWN_VERTEX",
        /// A dynamic index pointed past the end of the vertex table.
        IndexOutOfBounds => IndexOutOfBounds { .. } => "GRAPH_INDEX_OUT_OF_BOUNDS",
    }
}

/// An error reported by a [`crate::CandidateProducer`] or [`crate::VertexScorer`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ProducerError {
    /// The ranking procedure failed.
    #[error("ranking failed: {reason}")]
    Failed {
        /// Human-readable description supplied by the producer.
        reason: String,
    },
    /// A scorer returned a different number of scores than there are vertices.
    #[error("scorer returned {got} scores for {expected} vertices")]
    ScoreCountMismatch {
        /// Number of vertices in the graph.
        expected: usize,
        /// Number of scores produced.
        got: usize,
    },
}

impl ProducerError {
    /// Convenience constructor for [`ProducerError::Failed`].
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::ProducerError;
    ///
    /// let err = ProducerError::failed("model weights missing");
    /// assert_eq!(err.to_string(), "ranking failed: model weights missing");
    /// ```
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

define_error_codes! {
    /// Stable codes describing [`ProducerError`] variants.
    enum ProducerErrorCode for ProducerError {
        /// The ranking procedure failed.
        Failed => Failed { .. } => "PRODUCER_FAILED",
        /// A scorer returned a different number of scores than there are vertices.
        ScoreCountMismatch => ScoreCountMismatch { .. } => "PRODUCER_SCORE_COUNT_MISMATCH",
    }
}

/// Violations of the early-stopping sentinel placement rules.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SentinelError {
    /// The sentinel appeared as the first record.
    #[error("the early-stopping sentinel cannot be the first record")]
    Leading,
    /// The sentinel was followed by further records.
    #[error("the early-stopping sentinel at position {position} is not the last of {len} records")]
    NotLast {
        /// Zero-based position of the sentinel.
        position: usize,
        /// Total number of records.
        len: usize,
    },
    /// A record was appended after the log had been closed by the sentinel.
    #[error("the removal log is closed by an early-stopping sentinel")]
    Closed,
}

define_error_codes! {
    /// Stable codes describing [`SentinelError`] variants.
    enum SentinelErrorCode for SentinelError {
        /// The sentinel appeared as the first record.
        Leading => Leading => "SENTINEL_LEADING",
        /// The sentinel was followed by further records.
        NotLast => NotLast { .. } => "SENTINEL_NOT_LAST",
        /// A record was appended after the log had been closed by the sentinel.
        Closed => Closed => "SENTINEL_LOG_CLOSED",
    }
}

/// Failures raised by a [`crate::BulkDismantler`] or the translation cache.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum BulkEngineError {
    /// The removal order or a returned step named a vertex the edge list lacks.
    #[error("vertex {vertex} is not part of the translated edge list")]
    UnknownVertex {
        /// The unresolved static id.
        vertex: StaticId,
    },
    /// The removal order listed a vertex twice.
    #[error("vertex {vertex} appears twice in the removal order")]
    DuplicateVertex {
        /// The repeated static id.
        vertex: StaticId,
    },
    /// The engine failed for an engine-specific reason.
    #[error("bulk engine failed: {reason}")]
    Failed {
        /// Description reported by the engine.
        reason: String,
    },
    /// A shared translation cache lock was poisoned by a panicking holder.
    #[error("translation cache lock is poisoned")]
    CachePoisoned,
}

define_error_codes! {
    /// Stable codes describing [`BulkEngineError`] variants.
    enum BulkEngineErrorCode for BulkEngineError {
        /// The removal order or a returned step named an unknown vertex.
        UnknownVertex => UnknownVertex { .. } => "BULK_UNKNOWN_VERTEX",
        /// The removal order listed a vertex twice.
        DuplicateVertex => DuplicateVertex { .. } => "BULK_DUPLICATE_VERTEX",
        /// The engine failed for an engine-specific reason.
        Failed => Failed { .. } => "BULK_ENGINE_FAILED",
        /// A shared translation cache lock was poisoned.
        CachePoisoned => CachePoisoned => "BULK_CACHE_POISONED",
    }
}

/// Broad failure category of a [`DismantleError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The run was configured with invalid parameters.
    Configuration,
    /// The candidate producer (or scorer) failed.
    ProducerFailure,
    /// An engine invariant was broken; never silently corrected.
    InvariantViolation,
    /// The delegated bulk engine failed.
    ExternalEngineFailure,
}

/// Error type produced when configuring or running a dismantling simulation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DismantleError {
    /// A fractional stop condition was outside `[0, 1]` or not finite.
    #[error("stop condition fraction must lie in [0, 1] (got {got})")]
    InvalidStopFraction {
        /// The rejected fraction.
        got: f64,
    },
    /// The early-stopping AUC ceiling was NaN.
    #[error("early-stopping AUC ceiling must be a number (got {got})")]
    InvalidEarlyStoppingAuc {
        /// The rejected ceiling.
        got: f64,
    },
    /// The candidate producer failed; the run was aborted.
    #[error("producer `{producer}` failed on graph `{graph}` at step {step}: {error}")]
    Producer {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Name reported by the producer.
        producer: String,
        /// Handshake cycle during which the failure happened (0 = start).
        step: usize,
        /// Underlying producer error.
        #[source]
        error: ProducerError,
    },
    /// The producer proposed a vertex that is not in the graph.
    #[error("graph `{graph}` has no vertex {vertex} (proposed at step {step})")]
    UnknownVertex {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Handshake cycle of the proposal.
        step: usize,
        /// The unresolved static id.
        vertex: StaticId,
    },
    /// The static-to-dynamic mapping resolved to a vertex with another static id.
    #[error("graph `{graph}` maps vertex {vertex} to index {index}, which holds {found}")]
    IdMismatch {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Static id that was looked up.
        vertex: StaticId,
        /// Dynamic index it resolved to.
        index: usize,
        /// Static id actually stored at that index.
        found: StaticId,
    },
    /// A policy that needs at least one step received no candidates at all.
    #[error("graph `{graph}`: the {policy} policy received an empty candidate stream")]
    EmptyCandidateStream {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Policy that required a first step.
        policy: PolicyKind,
    },
    /// The ask/answer ordering of the candidate handshake was broken.
    #[error("graph `{graph}`: candidate handshake violated at step {step}: {detail}")]
    HandshakeViolation {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Handshake cycle.
        step: usize,
        /// What went wrong.
        detail: &'static str,
    },
    /// A removal log broke the sentinel placement rules.
    #[error("graph `{graph}`: {error}")]
    Sentinel {
        /// Graph the records belong to.
        graph: GraphIdentity,
        /// The specific placement rule that failed.
        #[source]
        error: SentinelError,
    },
    /// Building or editing the graph failed.
    #[error("graph `{graph}`: {error}")]
    Graph {
        /// Graph being edited.
        graph: GraphIdentity,
        /// Underlying graph error.
        #[source]
        error: GraphError,
    },
    /// The delegated bulk engine failed.
    #[error("bulk engine `{engine}` failed on graph `{graph}`: {error}")]
    ExternalEngine {
        /// Graph being dismantled.
        graph: GraphIdentity,
        /// Name of the engine.
        engine: String,
        /// Underlying engine error.
        #[source]
        error: BulkEngineError,
    },
}

define_error_codes! {
    /// Stable codes describing [`DismantleError`] variants.
    enum DismantleErrorCode for DismantleError {
        /// A fractional stop condition was outside `[0, 1]`.
        InvalidStopFraction => InvalidStopFraction { .. } => "DISMANTLE_INVALID_STOP_FRACTION",
        /// The early-stopping AUC ceiling was NaN.
        InvalidEarlyStoppingAuc => InvalidEarlyStoppingAuc { .. } => "DISMANTLE_INVALID_EARLY_STOPPING_AUC",
        /// The candidate producer failed.
        ProducerFailure => Producer { .. } => "DISMANTLE_PRODUCER_FAILURE",
        /// The producer proposed a vertex that is not in the graph.
        UnknownVertex => UnknownVertex { .. } => "DISMANTLE_UNKNOWN_VERTEX",
        /// The static-to-dynamic mapping was inconsistent.
        IdMismatch => IdMismatch { .. } => "DISMANTLE_ID_MISMATCH",
        /// A policy that needs one step received no candidates.
        EmptyCandidateStream => EmptyCandidateStream { .. } => "DISMANTLE_EMPTY_CANDIDATE_STREAM",
        /// The candidate handshake ordering was broken.
        HandshakeViolation => HandshakeViolation { .. } => "DISMANTLE_HANDSHAKE_VIOLATION",
        /// A removal log broke the sentinel placement rules.
        Sentinel => Sentinel { .. } => "DISMANTLE_SENTINEL",
        /// Building or editing the graph failed.
        Graph => Graph { .. } => "DISMANTLE_GRAPH",
        /// The delegated bulk engine failed.
        ExternalEngineFailure => ExternalEngine { .. } => "DISMANTLE_EXTERNAL_ENGINE_FAILURE",
    }
}

impl DismantleError {
    /// Classifies the error into one of the [`ErrorKind`] categories.
    ///
    /// # Examples
    /// ```
    /// use dismantle_core::{DismantleError, ErrorKind};
    ///
    /// let err = DismantleError::InvalidStopFraction { got: 1.5 };
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStopFraction { .. } | Self::InvalidEarlyStoppingAuc { .. } => {
                ErrorKind::Configuration
            }
            Self::Producer { .. } => ErrorKind::ProducerFailure,
            Self::UnknownVertex { .. }
            | Self::IdMismatch { .. }
            | Self::EmptyCandidateStream { .. }
            | Self::HandshakeViolation { .. }
            | Self::Sentinel { .. }
            | Self::Graph { .. } => ErrorKind::InvariantViolation,
            Self::ExternalEngine { .. } => ErrorKind::ExternalEngineFailure,
        }
    }

    /// Returns the identity of the graph involved, when the error has one.
    #[must_use]
    pub fn graph(&self) -> Option<&GraphIdentity> {
        match self {
            Self::InvalidStopFraction { .. } | Self::InvalidEarlyStoppingAuc { .. } => None,
            Self::Producer { graph, .. }
            | Self::UnknownVertex { graph, .. }
            | Self::IdMismatch { graph, .. }
            | Self::EmptyCandidateStream { graph, .. }
            | Self::HandshakeViolation { graph, .. }
            | Self::Sentinel { graph, .. }
            | Self::Graph { graph, .. }
            | Self::ExternalEngine { graph, .. } => Some(graph),
        }
    }

    /// Retrieve the inner [`ProducerErrorCode`] when a producer failed.
    #[must_use]
    pub const fn producer_code(&self) -> Option<ProducerErrorCode> {
        match self {
            Self::Producer { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`BulkEngineErrorCode`] when the bulk engine failed.
    #[must_use]
    pub const fn engine_code(&self) -> Option<BulkEngineErrorCode> {
        match self {
            Self::ExternalEngine { error, .. } => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, DismantleError>;
