//! Presentation of assembled routines.
//!
//! # Responsibility
//! - Define the render target contract the pipeline writes into.
//! - Provide the in-memory nested list target and the Markdown export.
//!
//! # Invariants
//! - A target is cleared and repopulated in one call; callers only invoke
//!   [`render_routine`] with a fully assembled routine.

mod markdown;
mod nested_list;

pub use markdown::format_markdown;
pub use nested_list::{ListEntry, NestedList};

use crate::model::routine::Routine;
use chrono::NaiveDate;

/// Mount point receiving one outer entry per day and one inner item per topic.
pub trait RenderTarget {
    fn clear(&mut self);
    fn append_day(&mut self, label: String, items: Vec<String>);
}

/// Display label used for a routine day, e.g. `Wed Feb 28 2024`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Replaces the target's contents with `routine`.
pub fn render_routine<T: RenderTarget + ?Sized>(target: &mut T, routine: &Routine) {
    target.clear();
    for day in routine {
        target.append_day(day_label(day.date), day.topics.clone());
    }
}
