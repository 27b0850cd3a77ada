//! Embedded schema for the events database.
//!
//! Each migration carries SQL compiled in with [`include_str!`]. Applied
//! versions are recorded in `schema_version`; a version is applied inside one
//! transaction together with its record, so a restart never sees half a
//! schema.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{EventStoreError, Result};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// Ascending by version.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Events table with name, date and creator indexes",
    sql: include_str!("v001_events.sql"),
}];

/// Bring the schema up to date. Returns how many versions were applied;
/// `0` when the database was already current.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_version_table(conn)?;
    let current = applied_version(conn)?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > current);

    let mut applied = 0;
    for migration in pending {
        info!(
            version = migration.version,
            description = migration.description,
            "applying events schema migration"
        );
        apply_migration(conn, migration)?;
        applied += 1;
    }

    if applied == 0 {
        debug!(version = current, "events schema is current");
    } else {
        info!(applied, "events schema migrated");
    }
    Ok(applied)
}

/// Highest recorded version, `0` on a fresh database.
fn applied_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| EventStoreError::Migration {
            message: format!("failed to read schema_version: {e}"),
        })?;
    Ok(version)
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| EventStoreError::Migration {
        message: format!("failed to create schema_version table: {e}"),
    })?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    let migration_err = |what: &str, e: rusqlite::Error| EventStoreError::Migration {
        message: format!("{what} v{} ({}): {e}", migration.version, migration.description),
    };

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| migration_err("failed to begin", e))?;

    tx.execute_batch(migration.sql)
        .map_err(|e| migration_err("failed to apply", e))?;

    let _ = tx
        .execute(
            "INSERT INTO schema_version (version, applied_at, description)
             VALUES (?1, datetime('now'), ?2)",
            rusqlite::params![migration.version, migration.description],
        )
        .map_err(|e| migration_err("failed to record", e))?;

    tx.commit().map_err(|e| migration_err("failed to commit", e))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
