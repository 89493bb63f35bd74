//! Error taxonomy for compiling patterns and running searches.

use std::path::PathBuf;

use thiserror::Error;
use trawl_syntax::SyntaxError;

/// Errors surfaced to the caller of a search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The pattern text or its configuration is invalid.
    #[error("malformed pattern: {message}")]
    MalformedPattern {
        /// Description of the problem.
        message: String,
    },
    /// The pattern is valid but uses a construct the engine cannot run.
    #[error("unsupported pattern: {message}")]
    UnsupportedPattern {
        /// Description of the unsupported construct.
        message: String,
    },
    /// The search was cancelled before it completed.
    #[error("search cancelled")]
    Cancelled,
}

impl MatchError {
    /// Creates a malformed pattern error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPattern {
            message: message.into(),
        }
    }

    /// Creates an unsupported pattern error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedPattern {
            message: message.into(),
        }
    }
}

impl From<SyntaxError> for MatchError {
    fn from(error: SyntaxError) -> Self {
        Self::malformed(error.to_string())
    }
}

/// Failure of a single scheduled task.
///
/// [`TaskError::Cancelled`] and [`TaskError::Fatal`] end the whole search.
/// Every other variant only affects the file that raised it.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file that failed.
        path: PathBuf,
        /// The underlying syntax error.
        source: SyntaxError,
    },
    /// Cancellation was observed while the task ran.
    #[error("task cancelled")]
    Cancelled,
    /// An error that must abort the search.
    #[error(transparent)]
    Fatal(MatchError),
}

impl TaskError {
    /// Returns whether the error ends the search rather than one task.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Fatal(_))
    }

    /// Converts a fatal task error into the error reported to the caller.
    #[must_use]
    pub fn into_match_error(self) -> MatchError {
        match self {
            Self::Fatal(error) => error,
            _ => MatchError::Cancelled,
        }
    }
}
