//! Source span and position types for locating matched code.

use std::fmt;

use serde::{Deserialize, Serialize};
use trawl_syntax::{Node, Point};

/// A line and column position within a source file.
///
/// Both fields are zero-indexed to match Tree-sitter conventions. The
/// [`Display`](fmt::Display) form is one-based, as editors expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// Zero-indexed line number.
    pub line: u32,
    /// Zero-indexed column number (byte offset within the line).
    pub column: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the zero-indexed line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the zero-indexed column number.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    fn from_point(point: Point) -> Self {
        Self::new(saturate(point.row), saturate(point.column))
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.line.saturating_add(1),
            self.column.saturating_add(1)
        )
    }
}

/// A byte and line/column span in a UTF-8 source.
///
/// The byte range is half-open: `start_byte` is inclusive and `end_byte` is
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start_byte: u32,
    /// End byte offset (exclusive).
    pub end_byte: u32,
    /// Start position as line and column.
    pub start: LineCol,
    /// End position as line and column.
    pub end: LineCol,
}

impl Span {
    /// Creates a new span from byte offsets and line/column positions.
    #[must_use]
    pub const fn new(start_byte: u32, end_byte: u32, start: LineCol, end: LineCol) -> Self {
        Self {
            start_byte,
            end_byte,
            start,
            end,
        }
    }

    /// Returns the span covered by a syntax node.
    #[must_use]
    pub fn of(node: Node<'_>) -> Self {
        Self::new(
            saturate(node.start_byte()),
            saturate(node.end_byte()),
            LineCol::from_point(node.start_position()),
            LineCol::from_point(node.end_position()),
        )
    }

    /// Returns the smallest span covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &Self) -> Self {
        let (start_byte, start) = if other.start_byte < self.start_byte {
            (other.start_byte, other.start)
        } else {
            (self.start_byte, self.start)
        };
        let (end_byte, end) = if other.end_byte > self.end_byte {
            (other.end_byte, other.end)
        } else {
            (self.end_byte, self.end)
        };
        Self::new(start_byte, end_byte, start, end)
    }

    /// Returns the inclusive start byte offset.
    #[must_use]
    pub const fn start_byte(&self) -> u32 {
        self.start_byte
    }

    /// Returns the exclusive end byte offset.
    #[must_use]
    pub const fn end_byte(&self) -> u32 {
        self.end_byte
    }

    /// Returns the start line/column position.
    #[must_use]
    pub const fn start(&self) -> &LineCol {
        &self.start
    }

    /// Returns the end line/column position.
    #[must_use]
    pub const fn end(&self) -> &LineCol {
        &self.end
    }
}

fn saturate(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
