//! Error types for the CLI runtime.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;
use trawl::MatchError;
use trawl::telemetry::TelemetryError;
use trawl_core::ConfigurationError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("search root {0} is not a directory")]
    MissingRoot(Utf8PathBuf),
    #[error("failed to load configurations: {0}")]
    LoadConfigurations(ConfigurationError),
    #[error("configuration '{0}' not found")]
    UnknownConfiguration(String),
    #[error("either --pattern or --configurations with --named must be given")]
    MissingPattern,
    #[error("{0}")]
    Search(#[from] MatchError),
    #[error("failed to serialise match: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(io::Error),
}
