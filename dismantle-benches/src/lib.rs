//! Benchmark support crate for the dismantling engine.
//!
//! Provides seeded synthetic graphs and parameter types used by the
//! Criterion benchmarks for connectivity recomputation, k-core peeling, and
//! full dismantling runs on both the adaptive and bulk paths.

pub mod error;
pub mod params;
pub mod source;
