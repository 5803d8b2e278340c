//! Printable Markdown practice sheet.
//!
//! # Invariants
//! - The sessions table always has at least four item columns plus `Done`.
//! - The selection counts table lists every catalog topic, sorted by label.

use crate::model::routine::Routine;
use crate::model::topic::TopicCatalog;
use std::fmt::{self, Write};

const MIN_ITEM_COLUMNS: usize = 4;

/// Formats a sessions table followed by per-topic selection counts.
pub fn format_markdown(routine: &Routine, catalog: &TopicCatalog, generated_on: &str) -> String {
    let mut out = String::new();
    // `fmt::Write` for `String` never returns an error.
    if write_sheet(&mut out, routine, catalog, generated_on).is_err() {
        out.clear();
    }
    out
}

fn write_sheet(
    out: &mut impl Write,
    routine: &Routine,
    catalog: &TopicCatalog,
    generated_on: &str,
) -> fmt::Result {
    let columns = routine
        .days()
        .iter()
        .map(|day| day.topics.len())
        .max()
        .unwrap_or(0)
        .max(MIN_ITEM_COLUMNS);
    let item_headers: Vec<String> = (1..=columns).map(|n| format!("Item {n}")).collect();

    writeln!(out, "# Practice Routine\n")?;
    writeln!(out, "Generated on {generated_on}\n")?;
    writeln!(out, "## Sessions")?;
    writeln!(out, "| Session | Date | {} | Done |", item_headers.join(" | "))?;
    writeln!(out, "| --- | --- | {} | --- |", vec!["---"; columns].join(" | "))?;

    for (index, day) in routine.days().iter().enumerate() {
        let mut cells = day.topics.clone();
        cells.resize(columns, String::new());
        writeln!(
            out,
            "| {:02} | {} | {} |  |",
            index + 1,
            day.date.format("%Y-%m-%d"),
            cells.join(" | ")
        )?;
    }

    writeln!(out, "\n## Selection Counts\n")?;
    writeln!(out, "| Option | Count |")?;
    writeln!(out, "| --- | --- |")?;
    for (topic, count) in routine.topic_counts(catalog) {
        writeln!(out, "| {topic} | {count} |")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_markdown;
    use crate::model::topic::TopicCatalog;
    use crate::schedule::assembler::assemble;
    use chrono::NaiveDate;

    #[test]
    fn sessions_table_pads_to_four_items_and_counts_topics() {
        let catalog = TopicCatalog::default_catalog();
        let routine = assemble(
            &[vec![0, 2], vec![0]],
            catalog,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();

        let markdown = format_markdown(&routine, catalog, "January 01 2024");

        assert!(markdown.starts_with("# Practice Routine\n\nGenerated on January 01 2024\n"));
        assert!(markdown
            .contains("| Session | Date | Item 1 | Item 2 | Item 3 | Item 4 | Done |"));
        assert!(markdown.contains("| 01 | 2024-01-01 | scales | arpeggios |  |  |  |"));
        assert!(markdown.contains("| 02 | 2024-01-02 | scales |  |  |  |  |"));
        assert!(markdown.contains("| arpeggios | 1 |\n| chords | 0 |"));
        assert!(markdown.contains("| scales | 2 |"));
    }

    #[test]
    fn never_scheduled_topics_are_listed_at_zero() {
        let catalog = TopicCatalog::default_catalog();
        let routine = assemble(&[], catalog, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();

        let markdown = format_markdown(&routine, catalog, "January 01 2024");
        let counts: Vec<&str> = markdown
            .lines()
            .skip_while(|line| *line != "| --- | --- |")
            .skip(1)
            .collect();

        assert_eq!(counts.len(), catalog.len());
        assert!(counts.iter().all(|line| line.ends_with("| 0 |")));
        assert!(counts.contains(&"| song practice | 0 |"));
    }
}
