//! Text providers for the dismantling engine.
//!
//! Loads edge lists (one `source target` pair per line, whitespace or comma
//! separated) into a [`dismantle_core::Graph`], and ranking files (one
//! `vertex score` pair per line) into a candidate producer or a bulk scorer.
//! Paths ending in `.gz` are decompressed transparently.

mod errors;
mod graph;
mod lines;
mod open;
mod ranking;

pub use errors::EdgeListProviderError;
pub use graph::{EdgeListProvider, identity_from_path};
pub use ranking::Ranking;
