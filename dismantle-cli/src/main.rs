//! CLI entry point for the dismantling engine.
//!
//! Parses arguments with clap, runs one dismantling simulation, renders the
//! summary and removal table to stdout, and maps failures to a non-zero exit
//! code. Logging is initialised first so every later step can emit
//! structured diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use dismantle_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use dismantle_core::DismantleError;
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let outcome = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&outcome, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let core_error = err.downcast_ref::<CliError>().and_then(|cli_error| match cli_error {
            CliError::Core(core) => Some(core),
            CliError::Provider(_) => None,
        });
        let code = core_error.map(|core| field::display(core.code()));
        let producer_code = core_error
            .and_then(DismantleError::producer_code)
            .map(field::display);
        let engine_code = core_error
            .and_then(DismantleError::engine_code)
            .map(field::display);

        error!(
            error = %format!("{err:#}"),
            code,
            producer_code,
            engine_code,
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
