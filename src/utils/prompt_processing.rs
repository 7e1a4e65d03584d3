use std::collections::{HashMap, HashSet};
use regex::{Captures, Regex};
use lazy_static::lazy_static;

lazy_static! {
    /// Matches `{{`, `}}` and `{name}`. Escapes come first so `{{name}}` stays literal.
    pub(crate) static ref PLACEHOLDER_MATCH_RE: Regex =
        Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

/// Collects the names of all placeholders in a template string.
pub(crate) fn get_placeholders(string: &str) -> HashSet<String> {
    PLACEHOLDER_MATCH_RE.captures_iter(string)
        .filter_map(|captures| captures.get(1).map(|name| name.as_str().to_string()))
        .collect()
}

/// Replaces placeholders with their filling values and unescapes `{{` and `}}`.
///
/// Placeholders that have no value in `mapping` are kept verbatim.
pub(crate) fn replace_all_placeholders(original: &str, mapping: &HashMap<String, Option<String>>) -> String {
    PLACEHOLDER_MATCH_RE.replace_all(original, |captures: &Captures| {
        match captures.get(1) {
            Some(name) => match mapping.get(name.as_str()) {
                Some(Some(value)) => value.clone(),
                _ => captures[0].to_string(),
            },
            // "{{" -> "{", "}}" -> "}"
            None => captures[0][..1].to_string(),
        }
    }).into_owned()
}
