//! Schema steps for the routine store.
//!
//! # Responsibility
//! - Own the ordered list of schema steps: user documents, practice log,
//!   saved plans.
//! - Bring a connection from its recorded `PRAGMA user_version` to the
//!   newest step inside one transaction.
//!
//! # Invariants
//! - Step versions are contiguous from 1.
//! - A file stamped by a newer build is refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    SchemaStep {
        version: 2,
        name: "practice_log",
        sql: include_str!("0002_practice_log.sql"),
    },
    SchemaStep {
        version: 3,
        name: "saved_plans",
        sql: include_str!("0003_saved_plans.sql"),
    },
];

/// What a call to [`apply_migrations`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// Names of the steps run, oldest first. Empty when already current.
    pub applied: Vec<&'static str>,
}

/// Schema version written by the newest step this build knows.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades the store schema in place.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let from_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .skip_while(|step| step.version <= from_version)
        .collect();
    if pending.is_empty() {
        return Ok(MigrationReport {
            from_version,
            to_version: from_version,
            applied: Vec::new(),
        });
    }

    let tx = conn.transaction()?;
    for step in &pending {
        run_step(&tx, step)?;
    }
    tx.commit()?;

    let report = MigrationReport {
        from_version,
        to_version: latest,
        applied: pending.iter().map(|step| step.name).collect(),
    };
    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        report.from_version,
        report.to_version,
        report.applied.join(",")
    );
    Ok(report)
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> DbResult<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, SCHEMA_STEPS};
    use rusqlite::Connection;

    #[test]
    fn step_versions_are_contiguous_from_one() {
        for (position, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, position + 1, "step {}", step.name);
        }
    }

    #[test]
    fn partially_migrated_store_runs_only_missing_steps() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_STEPS[0].sql).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        let report = apply_migrations(&mut conn).unwrap();

        assert_eq!(report.from_version, 1);
        assert_eq!(report.to_version, latest_version());
        assert_eq!(report.applied, vec!["practice_log", "saved_plans"]);

        let again = apply_migrations(&mut conn).unwrap();
        assert!(again.applied.is_empty());
        assert_eq!(again.to_version, latest_version());
    }
}
