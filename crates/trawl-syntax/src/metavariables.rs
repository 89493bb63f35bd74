//! Metavariable naming rules and placeholder encoding.
//!
//! Pattern text uses `$name` and `$$$name`. Before parsing, each occurrence is
//! replaced by an identifier that every supported grammar accepts wherever an
//! expression or name may appear.

pub(crate) const PLACEHOLDER_PREFIX: &str = "__TRAWL_VAR_";
pub(crate) const PLACEHOLDER_SUFFIX: &str = "__";

/// Name of the wildcard metavariable that never records a binding.
pub(crate) const ANONYMOUS: &str = "_";

#[must_use]
pub(crate) const fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[must_use]
pub(crate) const fn is_name_continuation(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Reads a metavariable name from a character stream positioned just after
/// the `$` prefix.
///
/// Returns an empty string if the next character cannot start a name.
pub(crate) fn extract_name(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut name = String::new();

    let Some((_, first)) = chars.peek().copied() else {
        return name;
    };
    if !is_name_start(first) {
        return name;
    }
    name.push(first);
    chars.next();

    while let Some((_, c)) = chars.peek().copied() {
        if !is_name_continuation(c) {
            break;
        }
        name.push(c);
        chars.next();
    }

    name
}

#[must_use]
pub(crate) fn placeholder_for(name: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{name}{PLACEHOLDER_SUFFIX}")
}

#[must_use]
pub(crate) fn name_from_placeholder(text: &str) -> Option<&str> {
    text.strip_prefix(PLACEHOLDER_PREFIX)
        .and_then(|rest| rest.strip_suffix(PLACEHOLDER_SUFFIX))
}
