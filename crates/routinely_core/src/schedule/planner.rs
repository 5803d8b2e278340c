//! Gap-aware practice planner used by the built-in routine engine.
//!
//! # Responsibility
//! - Pick `items_per_session` topics per day out of `topic_count`.
//! - Force topics skipped for `max_gap` consecutive days into the next day.
//!
//! # Invariants
//! - Every emitted day holds exactly `items_per_session` distinct indices.
//! - Indices within a day are ascending.
//! - Equal seeds produce equal plans.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_TOPIC_COUNT: usize = 7;
pub const DEFAULT_ITEMS_PER_SESSION: usize = 4;
pub const DEFAULT_MAX_GAP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    NoTopics,
    InvalidItemsPerSession { items_per_session: usize, topic_count: usize },
    /// More topics are overdue on `session` than fit in one day.
    GapUnsatisfiable { session: usize, overdue: usize, items_per_session: usize },
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTopics => write!(f, "planner needs at least one topic"),
            Self::InvalidItemsPerSession {
                items_per_session,
                topic_count,
            } => write!(
                f,
                "items_per_session must be between 1 and {topic_count}, got {items_per_session}"
            ),
            Self::GapUnsatisfiable {
                session,
                overdue,
                items_per_session,
            } => write!(
                f,
                "cannot satisfy max_gap on session {session}: {overdue} topics overdue but only {items_per_session} slots"
            ),
        }
    }
}

impl Error for PlanError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub topic_count: usize,
    pub items_per_session: usize,
    pub max_gap: usize,
    pub seed: Option<u64>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            topic_count: DEFAULT_TOPIC_COUNT,
            items_per_session: DEFAULT_ITEMS_PER_SESSION,
            max_gap: DEFAULT_MAX_GAP,
            seed: None,
        }
    }
}

impl PlannerSettings {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.topic_count == 0 {
            return Err(PlanError::NoTopics);
        }
        if self.items_per_session == 0 || self.items_per_session > self.topic_count {
            return Err(PlanError::InvalidItemsPerSession {
                items_per_session: self.items_per_session,
                topic_count: self.topic_count,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Planner {
    settings: PlannerSettings,
}

impl Planner {
    pub fn new(settings: PlannerSettings) -> Result<Self, PlanError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Builds `sessions` days of topic indices.
    pub fn build(&self, sessions: u32) -> Result<Vec<Vec<usize>>, PlanError> {
        let PlannerSettings {
            topic_count,
            items_per_session,
            max_gap,
            seed,
        } = self.settings;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut days_since = vec![0usize; topic_count];
        let mut plan = Vec::with_capacity(sessions as usize);

        for session in 0..sessions as usize {
            let mut chosen: Vec<usize> = (0..topic_count)
                .filter(|&topic| days_since[topic] >= max_gap)
                .collect();
            if chosen.len() > items_per_session {
                return Err(PlanError::GapUnsatisfiable {
                    session,
                    overdue: chosen.len(),
                    items_per_session,
                });
            }

            let open_slots = items_per_session - chosen.len();
            if open_slots > 0 {
                let mut remaining: Vec<usize> = (0..topic_count)
                    .filter(|&topic| days_since[topic] < max_gap)
                    .collect();
                // Shuffle first so the stable sort breaks ties randomly.
                remaining.shuffle(&mut rng);
                remaining.sort_by_key(|&topic| Reverse(days_since[topic]));
                chosen.extend(remaining.into_iter().take(open_slots));
            }
            chosen.sort_unstable();

            for (topic, gap) in days_since.iter_mut().enumerate() {
                if chosen.binary_search(&topic).is_ok() {
                    *gap = 0;
                } else {
                    *gap += 1;
                }
            }
            plan.push(chosen);
        }

        Ok(plan)
    }
}
