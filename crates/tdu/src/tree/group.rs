//! File groups: leaves whose name matches a wildcard are filed under a
//! synthesized node named after the group

use serde::{Deserialize, Serialize};

/// A named set of wildcard patterns
///
/// Patterns support `?` (exactly one character) and `*` (any run of
/// characters, including none). Every other character matches itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileGroup {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FileGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern_matches(name, pattern))
    }
}

/// First group, in order, with a pattern matching `name`
pub fn matching_group<'a>(groups: &'a [FileGroup], name: &str) -> Option<&'a FileGroup> {
    groups.iter().find(|group| group.matches(name))
}

/// Whole-string wildcard match of `name` against `pattern`
pub fn pattern_matches(name: &str, pattern: &str) -> bool {
    let mut pattern_chars = pattern.chars();
    match pattern_chars.next() {
        None => name.is_empty(),
        Some('*') => {
            let rest = pattern_chars.as_str().trim_start_matches('*');
            if rest.is_empty() {
                return true;
            }
            name.char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(name.len()))
                .any(|i| pattern_matches(&name[i..], rest))
        }
        Some(p) => {
            let mut name_chars = name.chars();
            match name_chars.next() {
                Some(c) if p == '?' || p == c => {
                    pattern_matches(name_chars.as_str(), pattern_chars.as_str())
                }
                _ => false,
            }
        }
    }
}
