//! Small helpers shared across CLI tests.

use std::fs;
use std::io;
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, InputArgs, StopArgs, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Path `1 - 2 - 3 - 4 - 5` ranked centre-first.
pub(super) fn path_inputs(dir: &TempDir) -> io::Result<InputArgs> {
    Ok(InputArgs {
        edges: write_file(dir, "path.el", "1 2\n2 3\n3 4\n4 5\n")?,
        ranking: write_file(dir, "centre.txt", "3 0.9\n2 0.5\n4 0.4\n1 0.1\n5 0.0\n")?,
        name: None,
    })
}

pub(super) fn absolute(stop_condition: usize) -> StopArgs {
    StopArgs {
        threshold: 0.1,
        stop_condition: Some(stop_condition),
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
