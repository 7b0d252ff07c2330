//! Dismantling simulation engine.
//!
//! Removes vertices from a graph one candidate at a time, tracks how the
//! largest and second-largest connected components shrink, and stops under a
//! configurable policy. Non-adaptive rankings can instead be handed to a bulk
//! engine in one call.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod bulk;
mod connectivity;
mod engine;
mod error;
mod graph;
mod kcore;
mod policy;
mod producer;
mod record;
mod summary;
mod telemetry;
#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{DismantleParams, DismantlerBuilder, StopCondition},
    bulk::{
        BulkDismantler, BulkStep, EdgeListGraph, ExternalDismantler, LccThresholdBulkEngine,
        SharedTranslationCache, StaticScores, ThresholdBulkEngine, TranslationCache,
        TranslationStore, VertexScorer,
    },
    connectivity::{ComponentId, Components, connectivity},
    engine::{DismantleRun, Dismantler},
    error::{
        BulkEngineError, BulkEngineErrorCode, DismantleError, DismantleErrorCode, ErrorKind,
        GraphError, GraphErrorCode, ProducerError, ProducerErrorCode, Result, SentinelError,
        SentinelErrorCode,
    },
    graph::{DynamicId, Graph, GraphBuilder, GraphIdentity, StaticId},
    kcore::CoreNumbers,
    policy::{
        EarlyStopping, PolicyKind, PolicyState, RobustnessAuc, StopReason, StoppingPolicy,
        simpson,
    },
    producer::{Candidate, CandidateProducer, ProducerSession, RankedCandidates, RunSnapshot},
    record::{RemovalLog, RemovalRecord, SENTINEL_SEQUENCE, validate_sentinel},
    summary::{RunSummary, RunTimings},
};
