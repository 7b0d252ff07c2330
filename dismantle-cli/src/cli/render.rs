//! Text rendering of a finished command.

use std::io::{self, Write};

use super::ExecutionSummary;

/// Renders `outcome` to `writer`: a `key: value` header followed by one
/// tab-separated row per record (the early-stopping sentinel included).
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::time::Duration;
/// # use dismantle_cli::cli::{ExecutionSummary, render_summary};
/// # use dismantle_core::{
/// #     DismantleRun, GraphIdentity, PolicyKind, RemovalLog, RemovalRecord, StaticId, StopReason,
/// # };
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut records = RemovalLog::new();
/// records.push(RemovalRecord::accepted(1, StaticId::new(3), 0.9, 0.4, 0.4))?;
/// let run = DismantleRun {
///     graph: GraphIdentity::from("path"),
///     policy: PolicyKind::Threshold,
///     records,
///     prediction_time: Duration::ZERO,
///     dismantle_time: Duration::ZERO,
///     stop_reason: StopReason::Dismantled,
///     final_auc: 0.0,
///     stop_condition: 2,
///     original_vertex_count: 5,
/// };
/// let outcome = ExecutionSummary {
///     producer: "centre".into(),
///     threshold: None,
///     summary: run.summary()?,
///     run,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&outcome, &mut buffer)?;
/// let text = String::from_utf8(buffer)?;
/// assert!(text.starts_with("graph: path\n"));
/// assert!(text.ends_with("1\t3\t0.9\t0.4\t0.4\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(outcome: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let ExecutionSummary {
        producer,
        threshold,
        run,
        summary,
    } = outcome;
    writeln!(writer, "graph: {}", run.graph)?;
    writeln!(writer, "policy: {}", run.policy)?;
    writeln!(writer, "producer: {producer}")?;
    match threshold {
        Some(threshold) => writeln!(writer, "threshold: {threshold}")?,
        None => writeln!(writer, "threshold: -")?,
    }
    writeln!(writer, "stop condition: {}", run.stop_condition)?;
    writeln!(writer, "stop reason: {}", run.stop_reason)?;
    writeln!(writer, "rem_num: {}", summary.removal_count())?;
    writeln!(writer, "early stopped: {}", summary.early_stopped())?;
    writeln!(writer, "r_auc: {}", summary.auc())?;
    match summary.peak_slcc() {
        Some(peak) => {
            writeln!(writer, "slcc_peak_at: {}", peak.sequence)?;
            writeln!(writer, "lcc_size_at_peak: {}", peak.lcc_fraction)?;
            writeln!(writer, "slcc_size_at_peak: {}", peak.slcc_fraction)?;
        }
        None => {
            writeln!(writer, "slcc_peak_at: -")?;
            writeln!(writer, "lcc_size_at_peak: -")?;
            writeln!(writer, "slcc_size_at_peak: -")?;
        }
    }
    writeln!(writer, "prediction_time: {:.6}", summary.prediction_time().as_secs_f64())?;
    writeln!(writer, "dismantle_time: {:.6}", summary.dismantle_time().as_secs_f64())?;
    writeln!(writer, "sequence\tvertex\tscore\tlcc\tslcc")?;
    for record in &run.records {
        match record.vertex {
            Some(vertex) => writeln!(
                writer,
                "{}\t{vertex}\t{}\t{}\t{}",
                record.sequence, record.score, record.lcc_fraction, record.slcc_fraction
            )?,
            None => writeln!(writer, "-1\t-1\t-1\t-1\t-1")?,
        }
    }
    Ok(())
}
