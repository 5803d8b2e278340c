//! In-memory render target printed as an indented Markdown-style list.

use super::RenderTarget;
use std::fmt::{Display, Formatter};

/// One outer list item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub label: String,
    pub items: Vec<String>,
}

/// In-memory two-level list; prints as an indented bullet list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedList {
    entries: Vec<ListEntry>,
}

impl NestedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RenderTarget for NestedList {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn append_day(&mut self, label: String, items: Vec<String>) {
        self.entries.push(ListEntry { label, items });
    }
}

impl Display for NestedList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "- {}", entry.label)?;
            for item in &entry.items {
                writeln!(f, "  - {item}")?;
            }
        }
        Ok(())
    }
}
