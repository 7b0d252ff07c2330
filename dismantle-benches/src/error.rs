//! Benchmark setup error type.

use dismantle_core::DismantleError;

use crate::source::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic graph generation failed.
    #[error("synthetic graph generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Configuring or running the dismantler failed.
    #[error("dismantling failed: {0}")]
    Dismantle(#[from] DismantleError),
}
