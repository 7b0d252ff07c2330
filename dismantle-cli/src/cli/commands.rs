//! Command implementations and argument parsing for the dismantle CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dismantle_core::{
    BulkDismantler, DismantleError, DismantleRun, DismantlerBuilder, ExternalDismantler, Graph,
    LccThresholdBulkEngine, PolicyKind, RunSummary, StopCondition, ThresholdBulkEngine,
    TranslationCache,
};
use dismantle_providers_edgelist::{
    EdgeListProvider, EdgeListProviderError, Ranking, identity_from_path,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_THRESHOLD: f64 = 0.1;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "dismantle", about = "Simulate the dismantling of a network.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Remove vertices one candidate at a time under a stopping policy.
    Run(RunCommand),
    /// Replay the whole ranking in a single bulk-engine call.
    Bulk(BulkCommand),
}

/// Input files shared by every command.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Edge list, one `source target` pair per line (`.gz` accepted).
    pub edges: PathBuf,

    /// Ranking file, one `vertex score` pair per line; higher scores go first.
    #[arg(long)]
    pub ranking: PathBuf,

    /// Override name for the graph (defaults to the edge-list file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Stop condition, as a fraction of the original vertex count or absolute.
#[derive(Debug, Args, Clone, Copy)]
pub struct StopArgs {
    /// Stop once the largest component holds at most this fraction of the
    /// original vertices.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD, conflicts_with = "stop_condition")]
    pub threshold: f64,

    /// Stop once the largest component holds at most this many vertices.
    #[arg(long = "stop-condition")]
    pub stop_condition: Option<usize>,
}

impl StopArgs {
    /// The stop condition these flags describe.
    #[must_use]
    pub fn stop_condition(self) -> StopCondition {
        self.stop_condition
            .map_or(StopCondition::Fraction(self.threshold), StopCondition::Absolute)
    }

    fn threshold(self) -> Option<f64> {
        self.stop_condition.is_none().then_some(self.threshold)
    }
}

/// Stopping policies selectable on the command line.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum PolicyArg {
    /// Accept every candidate; stop at the threshold.
    #[default]
    Threshold,
    /// Accept only vertices in the largest component.
    LccThreshold,
    /// As `lcc-threshold`, also stopping once the second-largest component
    /// peaks.
    LccPeak,
    /// As `lcc-threshold`, restricted to the 2-core.
    KcoreLccThreshold,
}

impl From<PolicyArg> for PolicyKind {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Threshold => Self::Threshold,
            PolicyArg::LccThreshold => Self::LccGated,
            PolicyArg::LccPeak => Self::PeakSlcc,
            PolicyArg::KcoreLccThreshold => Self::KCoreGated,
        }
    }
}

/// Built-in bulk engines.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum EngineArg {
    /// Remove every ranked vertex in order.
    #[default]
    Threshold,
    /// Skip vertices outside the current largest component.
    LccThreshold,
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Input files.
    #[command(flatten)]
    pub input: InputArgs,

    /// Stop condition.
    #[command(flatten)]
    pub stop: StopArgs,

    /// Stopping policy.
    #[arg(long, value_enum, default_value_t = PolicyArg::Threshold)]
    pub policy: PolicyArg,

    /// Stop early once the running AUC exceeds this value.
    #[arg(long)]
    pub early_stopping_auc: Option<f64>,

    /// Removals that must happen before early stopping may fire.
    #[arg(long)]
    pub early_stopping_min_removals: Option<usize>,
}

/// Options accepted by the `bulk` command.
#[derive(Debug, Args, Clone)]
pub struct BulkCommand {
    /// Input files.
    #[command(flatten)]
    pub input: InputArgs,

    /// Stop condition.
    #[command(flatten)]
    pub stop: StopArgs,

    /// Bulk engine to delegate to.
    #[arg(long, value_enum, default_value_t = EngineArg::Threshold)]
    pub engine: EngineArg,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading the edge list or ranking failed.
    #[error(transparent)]
    Provider(#[from] EdgeListProviderError),
    /// The dismantling run failed.
    #[error(transparent)]
    Core(#[from] DismantleError),
}

/// Outcome of one CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the producer or engine that chose the removals.
    pub producer: String,
    /// Fractional threshold, when the stop condition was given as one.
    pub threshold: Option<f64>,
    /// The full run.
    pub run: DismantleRun,
    /// Aggregated statistics of the run.
    pub summary: RunSummary,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading the inputs or the run fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use dismantle_cli::cli::{Cli, Command, InputArgs, PolicyArg, RunCommand, StopArgs, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let edges = dir.path().join("path.el");
/// let ranking = dir.path().join("centre.txt");
/// std::fs::write(&edges, "1 2\n2 3\n3 4\n4 5\n")?;
/// std::fs::write(&ranking, "3 1.0\n1 0.5\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         input: InputArgs { edges, ranking, name: None },
///         stop: StopArgs { threshold: 0.1, stop_condition: Some(2) },
///         policy: PolicyArg::Threshold,
///         early_stopping_auc: None,
///         early_stopping_min_removals: None,
///     }),
/// };
/// let outcome = run_cli(cli)?;
/// assert_eq!(outcome.run.graph.as_str(), "path");
/// assert_eq!(outcome.summary.removal_count(), 1);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
        Command::Bulk(bulk) => {
            Span::current().record("command", field::display("bulk"));
            bulk_command(bulk)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(policy = field::Empty, edges = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let policy = PolicyKind::from(command.policy);
    let span = Span::current();
    span.record("policy", field::display(policy));
    span.record("edges", field::display(command.input.edges.display()));

    let dismantler = DismantlerBuilder::new()
        .with_policy(policy)
        .with_stop_condition(command.stop.stop_condition())
        .with_early_stopping_auc(command.early_stopping_auc)
        .with_early_stopping_min_removals(command.early_stopping_min_removals)
        .build()?;
    let (mut graph, ranking) = load_inputs(&command.input)?;
    let mut producer = ranking.into_producer();
    let run = dismantler.run(&mut graph, &mut producer)?;
    finish(producer_name(&command.input), command.stop, run)
}

#[instrument(
    name = "cli.bulk",
    err,
    skip(command),
    fields(engine = field::Empty, edges = field::Empty),
)]
pub(super) fn bulk_command(command: BulkCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record("edges", field::display(command.input.edges.display()));
    let (graph, ranking) = load_inputs(&command.input)?;
    let stop = command.stop.stop_condition();
    let run = match command.engine {
        EngineArg::Threshold => run_bulk(ThresholdBulkEngine, stop, &graph, ranking)?,
        EngineArg::LccThreshold => run_bulk(LccThresholdBulkEngine, stop, &graph, ranking)?,
    };
    finish(producer_name(&command.input), command.stop, run)
}

fn run_bulk<E: BulkDismantler>(
    engine: E,
    stop: StopCondition,
    graph: &Graph,
    ranking: Ranking,
) -> Result<DismantleRun, CliError> {
    Span::current().record("engine", engine.name());
    let adapter = ExternalDismantler::new(engine, stop)?;
    let mut scorer = ranking.into_scorer();
    Ok(adapter.run(graph, &mut scorer, TranslationCache::default())?)
}

#[instrument(name = "cli.load", err, skip(input), fields(graph = field::Empty))]
pub(super) fn load_inputs(input: &InputArgs) -> Result<(Graph, Ranking), CliError> {
    let identity = input
        .name
        .as_deref()
        .map_or_else(|| identity_from_path(&input.edges), Into::into);
    Span::current().record("graph", field::display(&identity));
    let provider = EdgeListProvider::try_from_path(identity, &input.edges)?;
    info!(
        vertices = provider.graph().vertex_count(),
        edges = provider.graph().edge_count(),
        dropped_loops = provider.dropped_loops(),
        dropped_duplicates = provider.dropped_duplicates(),
        "edge list loaded"
    );
    let ranking = Ranking::try_from_path(producer_name(input), &input.ranking)?;
    Ok((provider.into_graph(), ranking))
}

fn producer_name(input: &InputArgs) -> String {
    identity_from_path(&input.ranking).as_str().to_owned()
}

fn finish(producer: String, stop: StopArgs, run: DismantleRun) -> Result<ExecutionSummary, CliError> {
    let summary = run.summary()?;
    info!(
        graph = %run.graph,
        removals = summary.removal_count(),
        auc = summary.auc(),
        reason = %run.stop_reason,
        "command completed"
    );
    Ok(ExecutionSummary {
        producer,
        threshold: stop.threshold(),
        run,
        summary,
    })
}
