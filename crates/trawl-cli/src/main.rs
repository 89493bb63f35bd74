//! CLI entrypoint for the Trawl structural search tool.
//!
//! The binary delegates to [`trawl_cli::run`], which parses arguments,
//! installs telemetry, runs the search, and writes results.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    trawl_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
