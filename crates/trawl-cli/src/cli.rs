//! CLI argument definitions for the Trawl search tool.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use trawl_core::{DEFAULT_LOG_FILTER, LogFormat};
use trawl_syntax::SupportedLanguage;

/// Output format for search results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per match.
    #[default]
    Json,
    /// `path:line:column: text` per match.
    Human,
}

/// Command-line interface for the Trawl structural search tool.
#[derive(Parser, Debug)]
#[command(name = "trawl", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Tracing filter expression, for example `trawl=debug`.
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Log output format.
    #[arg(long, global = true, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands of the Trawl CLI.
#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// Searches every source file below a directory.
    Search(SearchArgs),
}

/// Arguments of `trawl search`.
#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Directory to search.
    #[arg(value_name = "ROOT")]
    pub(crate) root: Utf8PathBuf,
    /// Pattern text, using `$name` and `$$$name` metavariables.
    #[arg(
        long,
        conflicts_with = "configurations",
        required_unless_present = "configurations"
    )]
    pub(crate) pattern: Option<String>,
    /// Language the pattern is written in.
    #[arg(long, default_value_t = SupportedLanguage::Rust)]
    pub(crate) language: SupportedLanguage,
    /// Looks through wrapper nodes when matching from a target.
    #[arg(long)]
    pub(crate) loose: bool,
    /// JSON file of named configurations.
    #[arg(long, requires = "named")]
    pub(crate) configurations: Option<Utf8PathBuf>,
    /// Name of the configuration to search with.
    #[arg(long, requires = "configurations")]
    pub(crate) named: Option<String>,
    /// How matches are printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) output: OutputFormat,
}

