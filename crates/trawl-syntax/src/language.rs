//! Host languages and the grammar facts the matcher relies on.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

/// Languages that patterns can be written in and files can be searched for.
///
/// A parsed tree carries the language it was produced with, which is how the
/// engine decides whether a tree is eligible for a pattern.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SupportedLanguage {
    /// Rust source files.
    #[default]
    Rust,
    /// Python source files.
    Python,
    /// TypeScript and TSX source files.
    TypeScript,
}

struct Grammar {
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
    wrappers: &'static [&'static str],
}

const RUST: Grammar = Grammar {
    aliases: &["rust", "rs"],
    extensions: &["rs"],
    wrappers: &["parenthesized_expression", "expression_statement"],
};

const PYTHON: Grammar = Grammar {
    aliases: &["python", "py"],
    extensions: &["py", "pyi"],
    wrappers: &["parenthesized_expression", "expression_statement"],
};

const TYPESCRIPT: Grammar = Grammar {
    aliases: &["typescript", "ts", "tsx"],
    extensions: &["ts", "tsx", "mts", "cts"],
    wrappers: &["parenthesized_expression", "expression_statement"],
};

impl SupportedLanguage {
    const fn grammar(self) -> &'static Grammar {
        match self {
            Self::Rust => &RUST,
            Self::Python => &PYTHON,
            Self::TypeScript => &TYPESCRIPT,
        }
    }

    /// Detects the language from a file extension, ignoring case.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::iter().find(|language| {
            language
                .grammar()
                .extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    /// Detects the language of a file from its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter grammar. TypeScript uses the TSX grammar, which
    /// accepts plain TypeScript as well.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Returns the lower-case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Node kinds that wrap one expression without changing its meaning.
    ///
    /// Loose matching looks through these.
    #[must_use]
    pub const fn wrapper_kinds(self) -> &'static [&'static str] {
        self.grammar().wrappers
    }

    /// Embeds a code fragment in a function named `wrapper` so statement and
    /// expression fragments parse as a complete file.
    #[must_use]
    pub(crate) fn wrap_fragment(self, fragment: &str, wrapper: &str) -> String {
        match self {
            Self::Rust => {
                let body = fragment.trim_end();
                let terminator = if body.ends_with(';') || body.ends_with('}') {
                    ""
                } else {
                    ";"
                };
                format!("fn {wrapper}() {{ {body}{terminator} }}")
            }
            Self::Python => {
                let indented: String = fragment.lines().map(|line| format!("    {line}\n")).collect();
                format!("def {wrapper}():\n{indented}")
            }
            Self::TypeScript => format!("function {wrapper}() {{ {fragment} }}"),
        }
    }
}

/// Error raised for an unknown language name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let name = input.trim();
        Self::iter()
            .find(|language| {
                language
                    .grammar()
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| LanguageParseError(name.to_ascii_lowercase()))
    }
}
