//! Structural search over Tree-sitter syntax trees.
//!
//! A pattern is a fragment of code in the searched language with
//! metavariables in place of the parts that may vary. The engine compiles the
//! pattern once, then walks candidate trees looking for subtrees with the
//! same shape:
//!
//! - [`compiler`] parses the pattern and assigns a [`MatchingHandler`] to
//!   every pattern node.
//! - [`Matcher`] schedules one task per file or scope element, drains the
//!   queue through a pausable [`TaskScheduler`], and streams results into a
//!   [`MatchResultSink`].
//! - [`Matcher::match_by_down_up`] anchors a match at a node that stands for
//!   the pattern's target variable and climbs to the pattern's top level.
//!
//! ```no_run
//! use trawl::{CollectingMatchResultSink, Matcher, SearchScope, Workspace};
//! use trawl_core::MatchOptions;
//! use trawl_syntax::SupportedLanguage;
//!
//! # fn main() -> Result<(), trawl::MatchError> {
//! let workspace = Workspace::for_directory("src");
//! let mut sink = CollectingMatchResultSink::new();
//! let options = MatchOptions::new("foo($x)", SupportedLanguage::Python);
//! Matcher::new(&workspace).find_matches(Box::new(&mut sink), &options, SearchScope::Workspace)?;
//! for found in sink.matches() {
//!     println!("{}: {}", found.file(), found.text());
//! }
//! # Ok(())
//! # }
//! ```

mod cancellation;
pub mod compiler;
mod context;
mod down_up;
mod error;
mod handlers;
mod matcher;
mod scheduler;
mod sink;
pub mod telemetry;
mod visitor;
pub mod workspace;

pub use cancellation::CancellationToken;
pub use compiler::{CompiledPattern, PatternCache, PatternCompiler, PatternScope, RecursionGuard};
pub use context::{ContextState, MatchContext};
pub use error::{MatchError, TaskError};
pub use handlers::{MatchOutcome, MatchingHandler, TypedVariable};
pub use matcher::{MatchTask, Matcher, ScopeElement, SearchScope};
pub use scheduler::{MatchingProcess, SchedulerState, TaskRunner, TaskScheduler};
pub use sink::{
    CollectingMatchResultSink, DuplicateFilteringResultSink, MatchResultSink, ProgressIndicator,
};
pub use workspace::{
    DefaultProfile, FileIndex, FsTreeProvider, IndexedFile, StructuralProfile, TreeProvider,
    WalkdirIndex, Workspace,
};

#[cfg(test)]
mod tests;
