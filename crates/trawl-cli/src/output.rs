//! Rendering of match results.

use std::io::Write;

use trawl_core::MatchResult;

use crate::cli::OutputFormat;
use crate::errors::AppError;

/// Writes one line per match in `format`.
pub(crate) fn write_matches<W: Write>(
    out: &mut W,
    matches: &[MatchResult],
    format: OutputFormat,
) -> Result<(), AppError> {
    for result in matches {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, result).map_err(AppError::Serialise)?;
                writeln!(out).map_err(AppError::Write)?;
            }
            OutputFormat::Human => {
                writeln!(out, "{}", human_line(result)).map_err(AppError::Write)?;
            }
        }
    }
    out.flush().map_err(AppError::Write)
}

/// Formats a match as `path:line:column: text`, keeping only the first line
/// of the matched text.
pub(crate) fn human_line(result: &MatchResult) -> String {
    let first_line = result.text().lines().next().unwrap_or_default();
    result.span().map_or_else(
        || format!("{}: {first_line}", result.file()),
        |span| format!("{}:{}: {first_line}", result.file(), span.start()),
    )
}
