//! Installing the process-wide `tracing` subscriber.
//!
//! Library code only emits events. Binaries call [`initialise`] once at
//! start-up to decide where those events go.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, fmt};
use trawl_core::{LogFormat, LogSettings};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that the subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while installing the subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another subscriber is already installed.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs a stderr subscriber for `settings` the first time it succeeds.
///
/// Once a subscriber is installed, later calls return immediately and
/// ignore their settings. A failed call leaves nothing installed.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparseable filter and
/// [`TelemetryError::Subscriber`] if some other subscriber got there first.
pub fn initialise(settings: &LogSettings) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(settings))
        .map(|_| TelemetryHandle)
}

fn install(settings: &LogSettings) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(settings.filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match settings.format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
