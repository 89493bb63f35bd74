//! Pattern text parsing.
//!
//! A structural pattern is ordinary code in the host language with
//! metavariables standing in for the parts that may vary. Parsing replaces
//! each metavariable with a placeholder identifier, parses the result with
//! the host grammar, and exposes the nodes the matcher aligns against.
//!
//! # Pattern Syntax
//!
//! - `$name` matches one syntax node and binds it as `name`
//! - `$_` matches one syntax node without binding it
//! - `$$$name` matches zero or more sibling nodes and binds them as `name`
//!
//! Names start with an ASCII letter or `_` and continue with ASCII letters,
//! digits, or `_`.

use tree_sitter::Node;

use crate::error::{MetavariableProblem, SyntaxError};
use crate::language::SupportedLanguage;
use crate::metavariables::{ANONYMOUS, extract_name, name_from_placeholder, placeholder_for};
use crate::parser::{ParseResult, Parser};

const WRAPPER_NAME: &str = "__trawl_pattern_wrapper__";

/// Pattern text parsed into a Tree-sitter tree.
///
/// The tree is owned here, so nodes returned by [`Self::top_level_nodes`]
/// borrow from the pattern and stay valid for as long as it lives.
#[derive(Debug)]
pub struct ParsedPattern {
    source: String,
    language: SupportedLanguage,
    metavariables: Vec<MetaVariable>,
    parsed: ParseResult,
    wrapped: bool,
}

/// A metavariable occurring in pattern text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaVariable {
    /// The name without the `$` prefix.
    pub name: String,
    /// Whether the metavariable matches one node or a run of nodes.
    pub kind: MetaVarKind,
    /// Byte offset of the first `$` in the pattern text.
    pub offset: usize,
}

impl MetaVariable {
    /// Returns whether this is the `$_` wildcard, which never binds.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.name == ANONYMOUS
    }
}

/// The arity of a metavariable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaVarKind {
    /// Matches exactly one node (`$name`).
    Single,
    /// Matches zero or more sibling nodes (`$$$name`).
    Multiple,
}

impl ParsedPattern {
    /// Parses pattern text for the given language.
    ///
    /// Text that does not parse as a complete file is wrapped in a function
    /// body and parsed again, so statement and expression fragments are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::EmptyPattern`] for blank text or text with no
    /// syntax nodes, [`SyntaxError::InvalidMetavariable`] for malformed `$`
    /// sequences, and [`SyntaxError::UnparseablePattern`] when the grammar
    /// rejects the text even after wrapping.
    pub fn parse(source: &str, language: SupportedLanguage) -> Result<Self, SyntaxError> {
        if source.trim().is_empty() {
            return Err(SyntaxError::EmptyPattern);
        }

        let (normalised, metavariables) = normalise(source)?;

        let mut parser = Parser::new(language)?;
        let mut wrapped = false;
        let mut parsed = parser.parse(&normalised)?;
        if parsed.has_errors() {
            parsed = parser.parse(&language.wrap_fragment(&normalised, WRAPPER_NAME))?;
            wrapped = true;
        }
        if let Some(issue) = parsed.issues().first() {
            return Err(SyntaxError::unparseable(language, issue.to_string()));
        }

        let pattern = Self {
            source: source.to_owned(),
            language,
            metavariables,
            parsed,
            wrapped,
        };
        if pattern.top_level_nodes().is_empty() {
            return Err(SyntaxError::EmptyPattern);
        }
        Ok(pattern)
    }

    /// Returns the pattern text as written, before placeholder substitution.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language the pattern was parsed for.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns every metavariable occurrence in textual order.
    #[must_use]
    pub fn metavariables(&self) -> &[MetaVariable] {
        &self.metavariables
    }

    /// Returns the first occurrence of the named metavariable.
    #[must_use]
    pub fn metavariable(&self, name: &str) -> Option<&MetaVariable> {
        self.metavariables.iter().find(|meta| meta.name == name)
    }

    /// Returns whether the pattern contains any metavariables.
    #[must_use]
    pub fn has_metavariables(&self) -> bool {
        !self.metavariables.is_empty()
    }

    /// Returns the parsed tree of the normalised pattern text.
    #[must_use]
    pub const fn parsed(&self) -> &ParseResult {
        &self.parsed
    }

    /// Returns whether the text had to be wrapped in a function to parse.
    #[must_use]
    pub const fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Returns the normalised source text of a pattern node.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.parsed.text(node)
    }

    /// Returns the metavariable a pattern node stands for, if any.
    ///
    /// A node stands for a metavariable when its whole text is a placeholder,
    /// which holds for the placeholder identifier and for any wrapper node
    /// around it that adds no text of its own.
    #[must_use]
    pub fn metavariable_at(&self, node: Node<'_>) -> Option<&MetaVariable> {
        name_from_placeholder(self.text(node)).and_then(|name| self.metavariable(name))
    }

    /// Returns the nodes a match is aligned against, in textual order.
    ///
    /// These are the named children of the file root, or of the wrapper
    /// function's body when the text was wrapped. When the pattern is a
    /// single statement that only wraps an expression, the expression is
    /// returned instead, so a call pattern matches calls wherever they occur.
    /// Statement sequences are kept as statements so they align with the
    /// statements of a candidate block.
    #[must_use]
    pub fn top_level_nodes(&self) -> Vec<Node<'_>> {
        let container = self.container();
        let mut cursor = container.walk();
        let nodes: Vec<_> = container
            .named_children(&mut cursor)
            .filter(|node| !node.is_extra())
            .collect();
        match nodes.as_slice() {
            [only] => vec![unwrap_expression_statement(*only)],
            _ => nodes,
        }
    }

    fn container(&self) -> Node<'_> {
        let root = self.parsed.root_node();
        if !self.wrapped {
            return root;
        }

        let Some(wrapper) = root.named_child(0) else {
            return root;
        };
        wrapper
            .child_by_field_name("body")
            .or_else(|| {
                let mut cursor = wrapper.walk();
                wrapper
                    .named_children(&mut cursor)
                    .find(|child| child.kind().contains("block"))
            })
            .unwrap_or(wrapper)
    }
}

fn unwrap_expression_statement(node: Node<'_>) -> Node<'_> {
    if node.kind() != "expression_statement" {
        return node;
    }
    let mut cursor = node.walk();
    let mut named = node.named_children(&mut cursor).filter(|child| !child.is_extra());
    match (named.next(), named.next()) {
        (Some(only), None) => only,
        _ => node,
    }
}

/// Replaces metavariables with placeholders and records each occurrence.
fn normalise(source: &str) -> Result<(String, Vec<MetaVariable>), SyntaxError> {
    let mut out = String::with_capacity(source.len());
    let mut metavariables = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }

        let mut dollars = 1;
        while chars.peek().is_some_and(|(_, c)| *c == '$') {
            chars.next();
            dollars += 1;
        }
        let kind = match dollars {
            1 => MetaVarKind::Single,
            3 => MetaVarKind::Multiple,
            other => {
                return Err(SyntaxError::invalid_metavariable(
                    offset,
                    MetavariableProblem::PrefixLength(other),
                ));
            }
        };

        let name = extract_name(&mut chars);
        if name.is_empty() {
            return Err(SyntaxError::invalid_metavariable(
                offset,
                MetavariableProblem::MissingName,
            ));
        }

        out.push_str(&placeholder_for(&name));
        metavariables.push(MetaVariable { name, kind, offset });
    }

    Ok((out, metavariables))
}
