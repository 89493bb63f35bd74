//! Pattern compilation.
//!
//! Compiling turns [`MatchOptions`] into a [`CompiledPattern`]: the parsed
//! pattern tree, one [`MatchingHandler`] per pattern node, the typed
//! variables with their constraints resolved, and the cheap scope filter used
//! to skip files that cannot match.

mod cache;
mod guard;

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use trawl_core::{ConfigurationRegistry, MatchOptions, VariableConstraint};
use trawl_syntax::{
    ArrayBackedNodeIterator, MetaVarKind, Node, ParsedPattern, SupportedLanguage,
};

pub use cache::PatternCache;
pub use guard::RecursionGuard;

use crate::error::MatchError;
use crate::handlers::{MatchingHandler, TypedVariable};

const COMPILER_TARGET: &str = "trawl::compiler";

/// A pattern ready to be matched.
#[derive(Debug)]
pub struct CompiledPattern {
    options: MatchOptions,
    pattern: ParsedPattern,
    handlers: HashMap<usize, MatchingHandler>,
    variables: Vec<TypedVariable>,
    target: Option<usize>,
    scope: PatternScope,
}

impl CompiledPattern {
    /// Returns the options the pattern was compiled from.
    #[must_use]
    pub const fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Returns the parsed pattern.
    #[must_use]
    pub const fn parsed(&self) -> &ParsedPattern {
        &self.pattern
    }

    /// Returns the pattern language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.pattern.language()
    }

    /// Returns the normalised text of a pattern node.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        self.pattern.text(node)
    }

    /// Returns a fresh cursor over the top-level pattern nodes.
    #[must_use]
    pub fn nodes(&self) -> ArrayBackedNodeIterator<'_> {
        ArrayBackedNodeIterator::new(self.pattern.top_level_nodes())
    }

    /// Returns the handler assigned to a pattern node.
    #[must_use]
    pub fn handler(&self, node: Node<'_>) -> Option<MatchingHandler> {
        self.handlers.get(&node.id()).copied()
    }

    /// Returns whether the node stands for a metavariable.
    #[must_use]
    pub fn is_typed_var(&self, node: Node<'_>) -> bool {
        self.handler(node)
            .is_some_and(|handler| handler.variable().is_some())
    }

    /// Returns every typed variable, in order of first occurrence.
    #[must_use]
    pub fn variables(&self) -> &[TypedVariable] {
        &self.variables
    }

    /// Returns the typed variable at `index`.
    #[must_use]
    pub fn variable(&self, index: usize) -> Option<&TypedVariable> {
        self.variables.get(index)
    }

    /// Returns the typed variable with the given name.
    #[must_use]
    pub fn variable_named(&self, name: &str) -> Option<&TypedVariable> {
        self.variables.iter().find(|variable| variable.name() == name)
    }

    /// Returns the pattern node that stands for the target variable.
    #[must_use]
    pub fn target_node(&self) -> Option<Node<'_>> {
        let id = self.target?;
        find_by_id(self.pattern.parsed().root_node(), id)
    }

    /// Returns the scope filter derived from the pattern.
    #[must_use]
    pub const fn scope(&self) -> &PatternScope {
        &self.scope
    }
}

/// A cheap, conservative description of where a pattern can match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternScope {
    language: SupportedLanguage,
    required_words: Vec<String>,
}

impl PatternScope {
    /// Returns the language the pattern applies to.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Identifiers every match must contain verbatim.
    #[must_use]
    pub fn required_words(&self) -> &[String] {
        &self.required_words
    }

    /// Returns whether a file in `language` can contain a match.
    #[must_use]
    pub fn admits_language(&self, language: SupportedLanguage) -> bool {
        self.language == language
    }

    /// Returns whether `source` contains every required word.
    #[must_use]
    pub fn admits_source(&self, source: &str) -> bool {
        self.required_words
            .iter()
            .all(|word| source.contains(word.as_str()))
    }
}

/// Compiles options into patterns, resolving references through a registry.
#[derive(Debug)]
pub struct PatternCompiler<'r> {
    registry: &'r ConfigurationRegistry,
    guard: RecursionGuard,
}

impl<'r> PatternCompiler<'r> {
    /// Creates a compiler that resolves named references in `registry`.
    #[must_use]
    pub fn new(registry: &'r ConfigurationRegistry) -> Self {
        Self {
            registry,
            guard: RecursionGuard::new(),
        }
    }

    /// Compiles `options`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MalformedPattern`] for unparseable text, bad
    /// regular expressions, unknown or cyclic references, and
    /// [`MatchError::UnsupportedPattern`] for constraints the engine cannot
    /// honour.
    pub fn compile(&mut self, options: &MatchOptions) -> Result<Arc<CompiledPattern>, MatchError> {
        compile_with(self.registry, &mut self.guard, options).map(Arc::new)
    }

    /// Compiles a reference constraint.
    ///
    /// Text in double quotes is an inline pattern in `language`; anything
    /// else names a registered configuration.
    ///
    /// # Errors
    ///
    /// As for [`compile`](Self::compile).
    pub fn build_matcher(
        &mut self,
        constraint: &str,
        language: SupportedLanguage,
    ) -> Result<Arc<CompiledPattern>, MatchError> {
        build_matcher_with(self.registry, &mut self.guard, constraint, language)
    }

    /// Returns the recursion guard.
    #[must_use]
    pub const fn guard(&self) -> &RecursionGuard {
        &self.guard
    }
}

fn build_matcher_with(
    registry: &ConfigurationRegistry,
    guard: &mut RecursionGuard,
    constraint: &str,
    language: SupportedLanguage,
) -> Result<Arc<CompiledPattern>, MatchError> {
    let trimmed = constraint.trim();
    if let Some(inline) = strip_quotes(trimmed) {
        let options = MatchOptions::new(inline, language);
        return compile_with(registry, guard, &options).map(Arc::new);
    }

    let configuration = registry
        .get(trimmed)
        .ok_or_else(|| MatchError::malformed(format!("Configuration '{trimmed}' not found")))?;
    guard.with_entry(trimmed, |inner| {
        compile_with(registry, inner, configuration.options()).map(Arc::new)
    })
}

fn strip_quotes(text: &str) -> Option<&str> {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
}

fn compile_with(
    registry: &ConfigurationRegistry,
    guard: &mut RecursionGuard,
    options: &MatchOptions,
) -> Result<CompiledPattern, MatchError> {
    let pattern = ParsedPattern::parse(options.pattern(), options.language())?;

    let mut variables = Vec::new();
    let mut index_of = HashMap::new();
    for meta in pattern.metavariables() {
        if index_of.contains_key(&meta.name) {
            continue;
        }
        let (min, max) = match meta.kind {
            MetaVarKind::Single => (1, 1),
            MetaVarKind::Multiple => (0, usize::MAX),
        };
        index_of.insert(meta.name.clone(), variables.len());
        variables.push(TypedVariable::new(meta.name.clone(), min, max));
    }

    let mut target = None;
    for (name, constraint) in &options.constraints {
        let index = *index_of.get(name).ok_or_else(|| {
            MatchError::unsupported(format!("constraint names unknown variable '{name}'"))
        })?;
        if constraint.target {
            if target.is_some() {
                return Err(MatchError::unsupported("only one variable may be the target"));
            }
            target = Some(index);
        }
        let Some(variable) = variables.get_mut(index) else {
            continue;
        };
        apply_constraint(registry, guard, options.language(), name, constraint, variable)?;
    }

    let mut assigner = HandlerAssigner {
        pattern: &pattern,
        index_of: &index_of,
        handlers: HashMap::new(),
        required_words: Vec::new(),
        target_id: None,
        target,
    };
    for node in pattern.top_level_nodes() {
        assigner.assign(node, true);
    }
    let HandlerAssigner {
        handlers,
        required_words,
        target_id,
        ..
    } = assigner;

    tracing::debug!(
        target: COMPILER_TARGET,
        event = "pattern_compiled",
        language = %options.language(),
        handlers = handlers.len(),
        variables = variables.len(),
    );

    Ok(CompiledPattern {
        options: options.clone(),
        scope: PatternScope {
            language: pattern.language(),
            required_words,
        },
        pattern,
        handlers,
        variables,
        target: target_id,
    })
}

fn apply_constraint(
    registry: &ConfigurationRegistry,
    guard: &mut RecursionGuard,
    language: SupportedLanguage,
    name: &str,
    constraint: &VariableConstraint,
    variable: &mut TypedVariable,
) -> Result<(), MatchError> {
    let min = constraint.min_count.unwrap_or(variable.min_count());
    let max = constraint.max_count.unwrap_or(variable.max_count());
    if max == 0 {
        return Err(MatchError::unsupported(format!(
            "variable '{name}' may never match"
        )));
    }
    if min > max {
        return Err(MatchError::unsupported(format!(
            "variable '{name}' has minimum count {min} above maximum {max}"
        )));
    }

    let regex = constraint
        .regex
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|error| {
            MatchError::malformed(format!("invalid regular expression for '{name}': {error}"))
        })?;
    let reference = constraint
        .reference
        .as_deref()
        .map(|reference| build_matcher_with(registry, guard, reference, language))
        .transpose()?;

    variable.set_counts(min, max);
    variable.constrain(constraint.kinds.clone(), regex, reference, constraint.target);
    Ok(())
}

struct HandlerAssigner<'a, 'p> {
    pattern: &'p ParsedPattern,
    index_of: &'a HashMap<String, usize>,
    handlers: HashMap<usize, MatchingHandler>,
    required_words: Vec<String>,
    target_id: Option<usize>,
    target: Option<usize>,
}

impl HandlerAssigner<'_, '_> {
    fn assign(&mut self, node: Node<'_>, top_level: bool) {
        if let Some(&variable) = self
            .pattern
            .metavariable_at(node)
            .and_then(|meta| self.index_of.get(&meta.name))
        {
            if self.target == Some(variable) && self.target_id.is_none() {
                self.target_id = Some(node.id());
            }
            self.handlers.insert(
                node.id(),
                MatchingHandler::Substitution {
                    variable,
                    top_level,
                },
            );
            return;
        }

        if node.child_count() == 0 {
            if node.kind().contains("identifier") {
                let word = self.pattern.text(node).to_owned();
                if !self.required_words.contains(&word) {
                    self.required_words.push(word);
                }
            }
            self.handlers
                .insert(node.id(), MatchingHandler::Literal { top_level });
            return;
        }

        self.handlers
            .insert(node.id(), MatchingHandler::Structural { top_level });
        let mut cursor = node.walk();
        let children: Vec<_> = node
            .children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect();
        for child in children {
            self.assign(child, false);
        }
    }
}

fn find_by_id(node: Node<'_>, id: usize) -> Option<Node<'_>> {
    if node.id() == id {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_by_id(child, id))
}
