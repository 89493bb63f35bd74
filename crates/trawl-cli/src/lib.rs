//! Command-line interface runtime for the Trawl structural search tool.
//!
//! The runtime owns argument parsing, telemetry set-up, option resolution,
//! and result rendering. It writes to caller-supplied streams so tests can
//! drive it without spawning a process.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use trawl::{CollectingMatchResultSink, Matcher, SearchScope, Workspace, telemetry};
use trawl_core::{ConfigurationRegistry, LogSettings, MatchOptions, MatchResult};

mod cli;
mod errors;
mod output;

pub use cli::OutputFormat;
use cli::{Cli, CliCommand, SearchArgs};
use errors::AppError;

const CLI_TARGET: &str = "trawl::cli";
const NO_MATCHES: u8 = 1;
const FAILURE: u8 = 2;

/// Runs the CLI using the provided arguments and IO handles.
///
/// Exits with 0 when matches were found, 1 when none were, and 2 on any
/// error.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    match execute(&cli, stdout) {
        Ok(0) => ExitCode::from(NO_MATCHES),
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            report(stderr, &error);
            ExitCode::from(FAILURE)
        }
    }
}

fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    let rendered = error.render();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if write!(stdout, "{rendered}").is_err() {
                return ExitCode::from(FAILURE);
            }
            ExitCode::SUCCESS
        }
        _ => {
            report(stderr, &rendered);
            ExitCode::from(FAILURE)
        }
    }
}

fn report<E: Write>(stderr: &mut E, message: &dyn fmt::Display) {
    if writeln!(stderr, "trawl: {message}").is_err() {
        tracing::debug!(target: CLI_TARGET, event = "stderr_unwritable");
    }
}

fn execute<W: Write>(cli: &Cli, stdout: &mut W) -> Result<usize, AppError> {
    telemetry::initialise(&LogSettings::new(cli.log_filter.as_str(), cli.log_format))?;
    let CliCommand::Search(args) = &cli.command;
    search(args, stdout)
}

fn search<W: Write>(args: &SearchArgs, stdout: &mut W) -> Result<usize, AppError> {
    if !args.root.is_dir() {
        return Err(AppError::MissingRoot(args.root.clone()));
    }
    let (registry, options) = resolve_options(args)?;
    let workspace = Workspace::for_directory(args.root.as_std_path()).with_registry(registry);

    let mut sink = CollectingMatchResultSink::new();
    {
        let mut matcher = Matcher::new(&workspace);
        matcher.find_matches(Box::new(&mut sink), &options, SearchScope::Workspace)?;
    }
    let mut matches = sink.into_matches();
    matches.sort_by_key(MatchResult::identity);

    tracing::debug!(
        target: CLI_TARGET,
        event = "search_finished",
        root = %args.root,
        matches = matches.len(),
    );
    output::write_matches(stdout, &matches, args.output)?;
    Ok(matches.len())
}

fn resolve_options(args: &SearchArgs) -> Result<(ConfigurationRegistry, MatchOptions), AppError> {
    if let (Some(path), Some(name)) = (&args.configurations, &args.named) {
        let registry =
            ConfigurationRegistry::from_path(path.as_std_path()).map_err(AppError::LoadConfigurations)?;
        let options = registry
            .get(name)
            .ok_or_else(|| AppError::UnknownConfiguration(name.clone()))?
            .options()
            .clone();
        let loose = args.loose || options.loose();
        return Ok((registry, options.with_loose(loose)));
    }
    let pattern = args.pattern.as_deref().ok_or(AppError::MissingPattern)?;
    let options = MatchOptions::new(pattern, args.language).with_loose(args.loose);
    Ok((ConfigurationRegistry::new(), options))
}

#[cfg(test)]
mod tests;
