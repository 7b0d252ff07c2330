//! Command-line interface for the dismantling engine.
//!
//! `run` drives the adaptive engine with a ranking file as the candidate
//! producer; `bulk` hands the same ranking to a built-in bulk engine. Both
//! load the graph from an edge list and print a summary followed by the
//! removal table.

mod commands;
mod render;

pub use commands::{
    BulkCommand, Cli, CliError, Command, EngineArg, ExecutionSummary, InputArgs, PolicyArg,
    RunCommand, StopArgs, run_cli,
};
pub use render::render_summary;

#[cfg(test)]
mod test_helpers;
