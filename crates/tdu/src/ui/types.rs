//! Types and enums used across the UI

use crate::tree::SortKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tree,
    Help,
    About,
}

/// Most recent sort, shown in the status bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub descending: bool,
    pub recursive: bool,
}

impl SortState {
    pub fn describe(&self) -> String {
        let mut text = format!("sort: {}", self.key.display_name());
        if self.descending {
            text.push_str(" (desc)");
        }
        if self.recursive {
            text.push_str(" (recursive)");
        }
        text
    }
}

/// Sort key selected by a letter; uppercase means descending
pub fn sort_key_for(c: char) -> Option<SortKey> {
    match c.to_ascii_lowercase() {
        's' => Some(SortKey::Size),
        'n' => Some(SortKey::Name),
        'u' => Some(SortKey::Original),
        'd' => Some(SortKey::Descendants),
        _ => None,
    }
}
