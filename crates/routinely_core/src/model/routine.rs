//! Assembled routine model.
//!
//! # Invariants
//! - Day N of a routine is dated `start + N days`.
//! - Topic labels keep the order the generator emitted their indices.
//! - Values are never mutated after assembly.

use crate::model::topic::TopicCatalog;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineDay {
    pub date: NaiveDate,
    pub topics: Vec<String>,
}

/// Ordered, dated, labeled practice schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    days: Vec<RoutineDay>,
}

impl Routine {
    pub(crate) fn from_days(days: Vec<RoutineDay>) -> Self {
        Self { days }
    }

    pub fn days(&self) -> &[RoutineDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Counts how many sessions schedule each topic label.
    ///
    /// Every catalog topic is present, at zero when never scheduled. Sorted by
    /// label so exports are stable.
    pub fn topic_counts(&self, catalog: &TopicCatalog) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = catalog
            .topics()
            .iter()
            .map(|topic| (topic.label.clone(), 0))
            .collect();
        for topic in self.days.iter().flat_map(|day| day.topics.iter()) {
            *counts.entry(topic.clone()).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Routine {
    type Item = &'a RoutineDay;
    type IntoIter = std::slice::Iter<'a, RoutineDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Routine, RoutineDay};
    use crate::model::topic::TopicCatalog;
    use chrono::NaiveDate;

    #[test]
    fn topic_counts_tallies_across_days() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let routine = Routine::from_days(vec![
            RoutineDay {
                date,
                topics: vec!["chords".to_string(), "scales".to_string()],
            },
            RoutineDay {
                date: date.succ_opt().unwrap(),
                topics: vec!["scales".to_string()],
            },
        ]);

        let catalog = TopicCatalog::from_labels(["scales", "chords", "ear training"]).unwrap();
        let counts = routine.topic_counts(&catalog);
        assert_eq!(counts.get("scales"), Some(&2));
        assert_eq!(counts.get("chords"), Some(&1));
        assert_eq!(counts.get("ear training"), Some(&0));
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.keys().next().map(String::as_str), Some("chords"));
    }
}
