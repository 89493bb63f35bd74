//! Parsing source text into owned syntax trees.
//!
//! A [`ParseResult`] keeps the tree and the text it was parsed from
//! together, so any node borrowed from it can be turned back into source.
//! Search candidates and pattern text go through the same wrapper.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tree_sitter::{Node, Tree};

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::position::point_to_one_based;

const SNIPPET_CHARS: usize = 40;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// A parsed source file or fragment.
///
/// Tree-sitter recovers from syntax errors, so a result may hold error
/// nodes. [`ParseResult::issues`] lists them.
#[derive(Debug)]
pub struct ParseResult {
    id: u64,
    tree: Tree,
    source: String,
    language: SupportedLanguage,
    path: Option<PathBuf>,
}

impl ParseResult {
    /// Records the file the source was read from.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the file the source was read from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns an id no other tree parsed by this process shares.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Names the tree in match results: its path, or `<memory>`.
    #[must_use]
    pub fn label(&self) -> String {
        self.path
            .as_deref()
            .map_or_else(|| String::from("<memory>"), |path| path.display().to_string())
    }

    /// Returns the source covered by `node`, or `""` for a foreign node.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Returns the full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language the source was parsed as.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the root node.
    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns whether the tree contains error or missing nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.root_node().has_error()
    }

    /// Lists error and missing nodes in document order.
    ///
    /// Subtrees without errors are skipped.
    #[must_use]
    pub fn issues(&self) -> Vec<SyntaxIssue> {
        let mut issues = Vec::new();
        let mut pending = vec![self.root_node()];
        while let Some(node) = pending.pop() {
            if node.is_error() || node.is_missing() {
                issues.push(SyntaxIssue::at(node, &self.source));
                continue;
            }
            if !node.has_error() {
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            pending.extend(children.into_iter().rev());
        }
        issues
    }
}

/// One place where the grammar could not make sense of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// Byte range of the offending node.
    pub byte_range: Range<usize>,
    /// One-based line of the start of the node.
    pub line: u32,
    /// One-based column of the start of the node.
    pub column: u32,
    /// The offending text, shortened to a few dozen characters.
    pub snippet: String,
    /// Kind of the node the parser expected but did not find, if any.
    pub missing: Option<String>,
}

impl SyntaxIssue {
    fn at(node: Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let text = source.get(byte_range.clone()).unwrap_or_default();
        let mut snippet: String = text.chars().take(SNIPPET_CHARS).collect();
        if text.chars().nth(SNIPPET_CHARS).is_some() {
            snippet.push_str("...");
        }
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            byte_range,
            line,
            column,
            snippet,
            missing: node.is_missing().then(|| node.kind().to_owned()),
        }
    }
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.missing {
            Some(kind) => write!(f, "{}:{}: missing {kind}", self.line, self.column),
            None => write!(f, "{}:{}: unexpected '{}'", self.line, self.column, self.snippet),
        }
    }
}

/// A Tree-sitter parser bound to one language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::GrammarUnavailable`] when Tree-sitter rejects
    /// the grammar.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|error| SyntaxError::GrammarUnavailable {
                language,
                reason: error.to_string(),
            })?;
        Ok(Self { inner, language })
    }

    /// Returns the language this parser reads.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source`, keeping a copy of the text in the result.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::NoTree`] if Tree-sitter gives up entirely.
    /// Ordinary syntax errors are reported through
    /// [`ParseResult::issues`] instead.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self.inner.parse(source, None).ok_or(SyntaxError::NoTree {
            language: self.language,
        })?;
        Ok(ParseResult {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            tree,
            source: source.to_owned(),
            language: self.language,
            path: None,
        })
    }
}
