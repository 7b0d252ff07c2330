//! Non-adaptive dismantling over a precomputed removal order.
//!
//! A [`VertexScorer`] ranks the graph once, the graph is translated into a
//! static-id [`EdgeListGraph`] (cached across runs), and a [`BulkDismantler`]
//! replays the whole order in a single call.

mod adapter;
mod cache;
mod edge_list;
mod engines;

pub use self::{
    adapter::{ExternalDismantler, StaticScores, VertexScorer},
    cache::{SharedTranslationCache, TranslationCache, TranslationStore},
    edge_list::EdgeListGraph,
    engines::{BulkDismantler, BulkStep, LccThresholdBulkEngine, ThresholdBulkEngine},
};
