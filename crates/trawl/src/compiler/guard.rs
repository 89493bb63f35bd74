//! Detection of configurations that reference themselves.

use std::collections::HashSet;

use crate::error::MatchError;

/// The configuration names currently being compiled on this call stack.
///
/// A compile that reaches a name already in flight is a reference cycle.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    in_flight: HashSet<String>,
}

impl RecursionGuard {
    /// Creates an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `body` with `name` marked as in flight.
    ///
    /// The mark is removed when `body` returns, whether it succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedPattern`] without running `body` when
    /// `name` is already in flight, and otherwise whatever `body` returns.
    pub fn with_entry<T>(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut Self) -> Result<T, MatchError>,
    ) -> Result<T, MatchError> {
        if !self.in_flight.insert(name.to_owned()) {
            tracing::debug!(
                target: "trawl::compiler",
                event = "reference_cycle",
                configuration = name,
            );
            return Err(MatchError::malformed("Pattern recursively references itself"));
        }
        let result = body(self);
        self.in_flight.remove(name);
        result
    }

    /// Returns whether `name` is currently being compiled.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    /// Returns whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}
