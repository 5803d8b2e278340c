//! Routine assembly from generator output.
//!
//! # Responsibility
//! - Zip a date sequence, the generator's daily index lists and the topic
//!   catalog into a presentation-ready [`Routine`].
//!
//! # Invariants
//! - `routine.len() == output.len()`.
//! - Day `i` is dated `today + i days` and lists `output[i]` labels in order.
//! - Assembly is all-or-nothing: a failure never exposes partial days.

use crate::model::routine::{Routine, RoutineDay};
use crate::model::topic::{OutOfRangeError, TopicCatalog, TopicIndex};
use crate::schedule::dates::sequence;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    /// A generator index did not resolve in the catalog.
    OutOfRange { day: usize, source: OutOfRangeError },
    /// The schedule runs past the last representable calendar date.
    CalendarOverflow { start: NaiveDate, days: usize },
}

impl Display for AssembleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { day, source } => write!(f, "day {day}: {source}"),
            Self::CalendarOverflow { start, days } => {
                write!(f, "{days} days starting {start} exceed the supported calendar")
            }
        }
    }
}

impl Error for AssembleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutOfRange { source, .. } => Some(source),
            Self::CalendarOverflow { .. } => None,
        }
    }
}

/// Builds a dated, labeled routine starting at `today`.
pub fn assemble(
    output: &[Vec<TopicIndex>],
    catalog: &TopicCatalog,
    today: NaiveDate,
) -> Result<Routine, AssembleError> {
    let dates: Vec<NaiveDate> = sequence(today, output.len()).collect();
    if dates.len() != output.len() {
        return Err(AssembleError::CalendarOverflow {
            start: today,
            days: output.len(),
        });
    }

    let days = dates
        .into_iter()
        .zip(output)
        .enumerate()
        .map(|(day, (date, indices))| {
            let topics = indices
                .iter()
                .map(|&index| catalog.label_of(index).map(str::to_string))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| AssembleError::OutOfRange { day, source })?;
            Ok::<_, AssembleError>(RoutineDay { date, topics })
        })
        .collect::<Result<Vec<_>, AssembleError>>()?;

    Ok(Routine::from_days(days))
}
