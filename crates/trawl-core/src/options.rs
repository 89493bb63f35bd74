//! Search options and per-variable constraints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trawl_syntax::SupportedLanguage;

/// Everything that determines how a pattern compiles.
///
/// Options are immutable once handed to the compiler and are hashable so a
/// compiled pattern can be cached per distinct options value.
///
/// # Example
///
/// ```
/// use trawl_core::{MatchOptions, VariableConstraint};
/// use trawl_syntax::SupportedLanguage;
///
/// let options = MatchOptions::new("foo($x)", SupportedLanguage::Python)
///     .with_loose(true)
///     .with_constraint("x", VariableConstraint::default().with_kinds(["integer"]));
/// assert!(options.loose());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// The language the pattern is written in.
    pub language: SupportedLanguage,
    /// The pattern text.
    pub pattern: String,
    /// Whether ancestor climbing may skip wrapper nodes.
    pub loose: bool,
    /// Constraints keyed by metavariable name.
    pub constraints: BTreeMap<String, VariableConstraint>,
}

impl MatchOptions {
    /// Creates options for a pattern with no constraints.
    #[must_use]
    pub fn new(pattern: impl Into<String>, language: SupportedLanguage) -> Self {
        Self {
            language,
            pattern: pattern.into(),
            loose: false,
            constraints: BTreeMap::new(),
        }
    }

    /// Sets loose matching.
    #[must_use]
    pub const fn with_loose(mut self, loose: bool) -> Self {
        self.loose = loose;
        self
    }

    /// Adds or replaces the constraint for a metavariable.
    #[must_use]
    pub fn with_constraint(mut self, name: impl Into<String>, constraint: VariableConstraint) -> Self {
        self.constraints.insert(name.into(), constraint);
        self
    }

    /// Returns the pattern language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns whether loose matching is enabled.
    #[must_use]
    pub const fn loose(&self) -> bool {
        self.loose
    }

    /// Returns the constraint for a metavariable, if one was declared.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&VariableConstraint> {
        self.constraints.get(name)
    }
}

/// Restrictions on what a metavariable may match.
///
/// Every field is optional; an empty constraint accepts any node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableConstraint {
    /// Node kinds the variable accepts. Empty accepts every kind.
    pub kinds: Vec<String>,
    /// A regular expression the node text must match.
    pub regex: Option<String>,
    /// Minimum number of nodes. Defaults to the metavariable's arity.
    pub min_count: Option<usize>,
    /// Maximum number of nodes. Defaults to the metavariable's arity.
    pub max_count: Option<usize>,
    /// Another pattern each bound node must match: quoted inline pattern
    /// text, or the name of a registered configuration.
    pub reference: Option<String>,
    /// Marks the variable as the anchor for down-up matching.
    pub target: bool,
}

impl VariableConstraint {
    /// Restricts the accepted node kinds.
    #[must_use]
    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    /// Requires the node text to match a regular expression.
    #[must_use]
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.regex = Some(regex.into());
        self
    }

    /// Sets the accepted node count range.
    #[must_use]
    pub const fn with_count(mut self, min: usize, max: usize) -> Self {
        self.min_count = Some(min);
        self.max_count = Some(max);
        self
    }

    /// Requires each bound node to match another pattern.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Marks the variable as the down-up anchor.
    #[must_use]
    pub const fn as_target(mut self) -> Self {
        self.target = true;
        self
    }
}
