//! Topic catalog model.
//!
//! # Responsibility
//! - Map generator-emitted topic indices to human-readable labels.
//! - Provide the process-wide default catalog.
//!
//! # Invariants
//! - A catalog is immutable once constructed.
//! - Valid indices are exactly `[0, len)`; negative indices never resolve.
//! - Labels are non-empty after trimming.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Integer key emitted by the routine generator.
///
/// Signed because generator payloads are untrusted; range checking happens
/// in [`TopicCatalog::label_of`].
pub type TopicIndex = i64;

const DEFAULT_TOPIC_LABELS: [&str; 7] = [
    "scales",
    "chords",
    "arpeggios",
    "finger picking",
    "alternate picking",
    "ear training",
    "song practice",
];

static DEFAULT_CATALOG: Lazy<TopicCatalog> = Lazy::new(|| TopicCatalog {
    topics: DEFAULT_TOPIC_LABELS
        .iter()
        .enumerate()
        .map(|(index, label)| Topic {
            index,
            label: (*label).to_string(),
        })
        .collect(),
});

/// One practice subject in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub index: usize,
    pub label: String,
}

/// Generator emitted an index that does not name a catalog topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRangeError {
    pub index: TopicIndex,
    pub catalog_size: usize,
}

impl Display for OutOfRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "topic index {} is outside catalog range [0, {})",
            self.index, self.catalog_size
        )
    }
}

impl Error for OutOfRangeError {}

/// Rejected catalog input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Empty,
    BlankLabel { position: usize },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "topic catalog must contain at least one topic"),
            Self::BlankLabel { position } => {
                write!(f, "topic label at position {position} is blank")
            }
        }
    }
}

impl Error for CatalogError {}

/// Fixed ordered list of practice topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    /// Builds a catalog from ordered labels.
    ///
    /// Labels are trimmed; position in the input becomes the topic index.
    ///
    /// # Errors
    /// - `CatalogError::Empty` when no labels are given.
    /// - `CatalogError::BlankLabel` when a label is empty after trimming.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut topics = Vec::new();
        for (index, label) in labels.into_iter().enumerate() {
            let trimmed = label.as_ref().trim();
            if trimmed.is_empty() {
                return Err(CatalogError::BlankLabel { position: index });
            }
            topics.push(Topic {
                index,
                label: trimmed.to_string(),
            });
        }

        if topics.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { topics })
    }

    /// Returns the shared built-in guitar practice catalog.
    pub fn default_catalog() -> &'static TopicCatalog {
        &DEFAULT_CATALOG
    }

    /// Resolves one index to its display label.
    pub fn label_of(&self, index: TopicIndex) -> Result<&str, OutOfRangeError> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.topics.get(position))
            .map(|topic| topic.label.as_str())
            .ok_or(OutOfRangeError {
                index,
                catalog_size: self.topics.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, OutOfRangeError, TopicCatalog};

    #[test]
    fn default_catalog_resolves_every_index_in_order() {
        let catalog = TopicCatalog::default_catalog();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.label_of(0).unwrap(), "scales");
        assert_eq!(catalog.label_of(3).unwrap(), "finger picking");
        assert_eq!(catalog.label_of(6).unwrap(), "song practice");
    }

    #[test]
    fn label_of_rejects_indices_outside_range() {
        let catalog = TopicCatalog::default_catalog();
        assert_eq!(
            catalog.label_of(7).unwrap_err(),
            OutOfRangeError {
                index: 7,
                catalog_size: 7
            }
        );
        assert!(catalog.label_of(-1).is_err());
    }

    #[test]
    fn from_labels_trims_and_rejects_blank_entries() {
        let catalog = TopicCatalog::from_labels([" warmup ", "sight reading"]).unwrap();
        assert_eq!(catalog.label_of(0).unwrap(), "warmup");

        let err = TopicCatalog::from_labels(["ok", "  "]).unwrap_err();
        assert_eq!(err, CatalogError::BlankLabel { position: 1 });

        let empty: [&str; 0] = [];
        assert_eq!(
            TopicCatalog::from_labels(empty).unwrap_err(),
            CatalogError::Empty
        );
    }
}
