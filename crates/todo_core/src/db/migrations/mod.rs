//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Upgrade legacy `tasks` tables that predate `priority`/`tags`.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Column backfills never drop or rewrite existing rows.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    apply: fn(&Connection) -> DbResult<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        apply: create_tasks_table,
    },
    Migration {
        version: 2,
        apply: add_priority_and_tags_columns,
    },
];

/// Columns added after the first public schema, with their SQL definitions.
const LEGACY_BACKFILL_COLUMNS: &[(&str, &str)] = &[
    ("priority", "TEXT NOT NULL DEFAULT 'medium'"),
    ("tags", "TEXT DEFAULT ''"),
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        (migration.apply)(&tx)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        current_version, latest
    );
    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Fails unless every migration known by this binary has been applied.
pub fn ensure_schema_ready(conn: &Connection) -> DbResult<()> {
    let db_version = current_user_version(conn)?;
    let required = latest_version();
    if db_version < required {
        return Err(DbError::SchemaNotReady {
            db_version,
            required,
        });
    }
    if db_version > required {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported: required,
        });
    }
    Ok(())
}

fn create_tasks_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(include_str!("0001_init.sql"))?;
    Ok(())
}

// Stores written by older releases have `user_version = 0` and a `tasks`
// table that may lack either column, so presence is checked per column.
fn add_priority_and_tags_columns(conn: &Connection) -> DbResult<()> {
    let existing = table_columns(conn, "tasks")?;
    for (name, definition) in LEGACY_BACKFILL_COLUMNS {
        if existing.iter().any(|column| column == name) {
            continue;
        }
        conn.execute_batch(&format!("ALTER TABLE tasks ADD COLUMN {name} {definition};"))?;
        info!("event=db_migrate_column module=db status=ok table=tasks column={name}");
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>("name")?);
    }
    Ok(columns)
}
