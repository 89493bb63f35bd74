//! Loading and parsing files for matching.

use std::fs;
use std::io::ErrorKind;

use trawl_syntax::{ParseResult, Parser};

use crate::cancellation::CancellationToken;
use crate::compiler::PatternScope;
use crate::error::TaskError;
use crate::workspace::IndexedFile;

/// Produces the syntax trees a file contributes to a search.
pub trait TreeProvider {
    /// Returns the trees of `file` that the pattern could match in.
    ///
    /// Files the scope rules out yield no trees. A file that disappeared
    /// since it was enumerated also yields no trees.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Io`] or [`TaskError::Parse`] for the file, and
    /// [`TaskError::Cancelled`] if cancellation is observed.
    fn trees_for(
        &self,
        file: &IndexedFile,
        scope: &PatternScope,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ParseResult>, TaskError>;

    /// Called once before a batch of reads begins.
    fn start_batch_processing(&self) {}

    /// Called once after a batch of reads ends.
    fn finish_batch_processing(&self) {}
}

/// [`TreeProvider`] that reads from the file system and parses with
/// Tree-sitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTreeProvider;

impl TreeProvider for FsTreeProvider {
    fn trees_for(
        &self,
        file: &IndexedFile,
        scope: &PatternScope,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ParseResult>, TaskError> {
        let Some(language) = file.language() else {
            return Ok(Vec::new());
        };
        if file.is_directory() || !scope.admits_language(language) {
            return Ok(Vec::new());
        }
        if cancellation.is_cancelled() {
            return Err(TaskError::Cancelled);
        }

        let path = file.path();
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(TaskError::Io {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        };
        if !scope.admits_source(&source) {
            tracing::trace!(
                target: "trawl::workspace",
                event = "file_skipped",
                path = %path.display(),
            );
            return Ok(Vec::new());
        }

        let parse_error = |source| TaskError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let mut parser = Parser::new(language).map_err(parse_error)?;
        let tree = parser.parse(&source).map_err(parse_error)?;
        Ok(vec![tree.with_path(path)])
    }

    fn start_batch_processing(&self) {
        tracing::debug!(target: "trawl::workspace", event = "batch_started");
    }

    fn finish_batch_processing(&self) {
        tracing::debug!(target: "trawl::workspace", event = "batch_finished");
    }
}
