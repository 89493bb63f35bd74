//! Owned data model for the Trawl structural search engine.
//!
//! Matching itself works on borrowed Tree-sitter nodes; everything in this
//! crate is owned so it can outlive the trees a search touched, cross thread
//! boundaries, and serialise as JSON.
//!
//! # Core types
//!
//! - [`Span`] and [`LineCol`]: byte and line/column source positions
//! - [`MatchedNode`] and [`Binding`]: nodes copied out of a match
//! - [`MatchResult`]: one successful match
//! - [`MatchOptions`] and [`VariableConstraint`]: what a pattern compiles with
//! - [`Configuration`] and [`ConfigurationRegistry`]: named saved patterns
//! - [`LogSettings`] and [`LogFormat`]: logging filter and output selection
//!
//! # Example
//!
//! ```
//! use trawl_core::{ConfigurationRegistry, LineCol, Span};
//!
//! let span = Span::new(0, 10, LineCol::new(0, 0), LineCol::new(0, 10));
//! assert_eq!(span.start_byte(), 0);
//!
//! let registry = ConfigurationRegistry::from_json(
//!     r#"{"configurations": [{"name": "calls", "language": "python", "pattern": "foo($x)"}]}"#,
//! )?;
//! assert!(registry.get("calls").is_some());
//! # Ok::<(), trawl_core::ConfigurationError>(())
//! ```

mod binding;
mod configuration;
mod logging;
mod match_result;
mod options;
mod span;

pub use binding::{Binding, MatchedNode};
pub use configuration::{Configuration, ConfigurationError, ConfigurationRegistry};
pub use logging::{DEFAULT_LOG_FILTER, LogFormat, LogFormatParseError, LogSettings};
pub use match_result::{MatchIdentity, MatchResult};
pub use options::{MatchOptions, VariableConstraint};
pub use span::{LineCol, Span};

#[cfg(test)]
mod tests;
