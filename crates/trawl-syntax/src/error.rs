//! Errors raised while parsing source and pattern text.

use thiserror::Error;

use crate::language::SupportedLanguage;

/// Errors from the syntax layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Tree-sitter refused the grammar, usually an ABI version mismatch.
    #[error("tree-sitter rejected the {language} grammar: {reason}")]
    GrammarUnavailable {
        /// The language whose grammar was rejected.
        language: SupportedLanguage,
        /// What Tree-sitter reported.
        reason: String,
    },

    /// Tree-sitter returned no tree at all.
    #[error("tree-sitter produced no tree for {language} source")]
    NoTree {
        /// The language being parsed.
        language: SupportedLanguage,
    },

    /// Pattern text holds no syntax nodes.
    #[error("pattern is empty")]
    EmptyPattern,

    /// Pattern text is not valid code in the host language, even wrapped in
    /// a function body.
    #[error("pattern is not valid {language}: {detail}")]
    UnparseablePattern {
        /// The host language.
        language: SupportedLanguage,
        /// Where parsing first went wrong.
        detail: String,
    },

    /// A `$` sequence in the pattern is not a metavariable.
    #[error("invalid metavariable at offset {offset}: {problem}")]
    InvalidMetavariable {
        /// Byte offset of the first `$`.
        offset: usize,
        /// What is wrong with it.
        problem: MetavariableProblem,
    },
}

/// Ways a `$` sequence can fail to be a metavariable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MetavariableProblem {
    /// Only `$` and `$$$` introduce metavariables.
    #[error("expected 1 or 3 '$' characters, found {0}")]
    PrefixLength(usize),
    /// The prefix is not followed by a valid name.
    #[error("missing name after '$'")]
    MissingName,
}

impl SyntaxError {
    /// Creates an unparseable pattern error.
    #[must_use]
    pub fn unparseable(language: SupportedLanguage, detail: impl Into<String>) -> Self {
        Self::UnparseablePattern {
            language,
            detail: detail.into(),
        }
    }

    /// Creates an invalid metavariable error.
    #[must_use]
    pub const fn invalid_metavariable(offset: usize, problem: MetavariableProblem) -> Self {
        Self::InvalidMetavariable { offset, problem }
    }
}
