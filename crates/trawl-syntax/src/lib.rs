//! Tree-sitter powered syntax layer for the Trawl structural search engine.
//!
//! This crate owns everything that touches raw Tree-sitter trees:
//!
//! - **Parsing** via [`Parser`], producing a [`ParseResult`] that owns the
//!   tree and the source text it was built from
//! - **Pattern text** via [`ParsedPattern`], which replaces metavariables
//!   with placeholder identifiers, parses the result with the host grammar,
//!   and exposes the top-level pattern nodes
//! - **Node iteration** via the [`NodeIterator`] trait and its array-backed
//!   and sibling-walking implementations
//!
//! # Supported Languages
//!
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//! - TypeScript (`.ts`, `.tsx`, `.mts`, `.cts`)
//!
//! # Pattern Language
//!
//! Patterns are ordinary code in the host language with metavariables in
//! place of the parts that may vary:
//!
//! - `$x` matches any single syntax node and binds it as `x`
//! - `$_` matches any single node without binding it
//! - `$$$args` matches zero or more sibling nodes and binds them as `args`
//!
//! # Example
//!
//! ```
//! use trawl_syntax::{ParsedPattern, SupportedLanguage};
//!
//! let pattern = ParsedPattern::parse("foo($x)", SupportedLanguage::Python)?;
//! let roots = pattern.top_level_nodes();
//! assert_eq!(roots.len(), 1);
//! assert_eq!(roots[0].kind(), "call");
//! # Ok::<(), trawl_syntax::SyntaxError>(())
//! ```

mod error;
mod iterators;
mod language;
mod metavariables;
mod parser;
mod pattern;
mod position;

pub use error::{MetavariableProblem, SyntaxError};
pub use iterators::{ArrayBackedNodeIterator, NodeIterator, SiblingNodeIterator};
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxIssue};
pub use pattern::{MetaVarKind, MetaVariable, ParsedPattern};
pub use position::point_to_one_based;

/// Re-exports of the Tree-sitter node and position types so downstream crates
/// name a single version of the grammar runtime.
pub use tree_sitter::{Node, Point};

#[cfg(test)]
mod tests;
