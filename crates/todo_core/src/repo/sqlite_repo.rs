//! SQLite task repository.
//!
//! # Responsibility
//! - Provide the task storage contract over the single `tasks` table.
//! - Keep SQL and column encodings inside the persistence boundary.
//!
//! # Invariants
//! - Connections are migrated before any task row is touched.
//! - Write paths validate the task before issuing SQL.
//! - Read paths reject corrupt rows (`RepoError::InvalidData`) instead of
//!   masking them. Legacy blanks (`''`/`NULL` priority or tags) read back as
//!   defaults.
//! - Ids come from SQLite `AUTOINCREMENT` and are never reused.
//!
//! # Column encodings
//! - `completed`: integer `0`/`1`.
//! - `tags`: JSON array text, `''` when empty.
//! - `created_at`/`updated_at`: RFC 3339 with explicit offset and fixed
//!   nanosecond precision, so text order matches time order.

use crate::db::migrations::ensure_schema_ready;
use crate::db::{open_db, open_db_in_memory};
use crate::model::task::{normalize_tags, Priority, Task, TaskId};
use crate::repo::{RepoError, RepoResult, TaskRepository};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    completed,
    priority,
    tags,
    created_at,
    updated_at
FROM tasks";

/// Accepted on read for rows written by older releases.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// SQLite-backed task repository owning its connection.
pub struct SqliteTaskRepository {
    conn: Connection,
}

impl SqliteTaskRepository {
    /// Opens (creating if needed) the database file and migrates it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_schema_ready(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn get_all(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Task> {
        load_task(&self.conn, id)?.ok_or(RepoError::NotFound(id))
    }

    fn create(&mut self, task: &mut Task) -> RepoResult<TaskId> {
        task.validate_timestamps()?;

        self.conn.execute(
            "INSERT INTO tasks (
                title,
                completed,
                priority,
                tags,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                task.title.as_str(),
                bool_to_int(task.completed),
                task.priority.as_str(),
                tags_to_db(&task.tags)?,
                timestamp_to_db(task.created_at),
                timestamp_to_db(task.updated_at),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        task.id = id;
        info!("event=task_create module=repo.sqlite status=ok id={id}");
        Ok(id)
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                completed = ?2,
                priority = ?3,
                tags = ?4,
                updated_at = ?5
             WHERE id = ?6;",
            params![
                task.title.as_str(),
                bool_to_int(task.completed),
                task.priority.as_str(),
                tags_to_db(&task.tags)?,
                timestamp_to_db(task.updated_at),
                task.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
        }

        info!("event=task_update module=repo.sqlite status=ok id={}", task.id);
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> RepoResult<()> {
        // IMMEDIATE takes the write lock up front, so no other connection can
        // remove the row between the existence check and the DELETE.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Presence only; a corrupt row must stay deletable.
        let exists = tx
            .query_row("SELECT 1 FROM tasks WHERE id = ?1;", [id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(RepoError::NotFound(id));
        }

        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;

        info!("event=task_delete module=repo.sqlite status=ok id={id}");
        Ok(())
    }
}

fn load_task(conn: &Connection, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }

    Ok(None)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let task = Task {
        id: row.get("id")?,
        title: row.get("title")?,
        completed,
        priority: priority_from_db(row.get("priority")?)?,
        tags: tags_from_db(row.get("tags")?)?,
        created_at: timestamp_from_db(&row.get::<_, String>("created_at")?, "created_at")?,
        updated_at: timestamp_from_db(&row.get::<_, String>("updated_at")?, "updated_at")?,
    };
    task.validate()?;
    Ok(task)
}

fn priority_from_db(value: Option<String>) -> RepoResult<Priority> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(Priority::default()),
        Some(text) => Priority::parse(text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{text}` in tasks.priority"))
        }),
    }
}

fn tags_to_db(tags: &[String]) -> RepoResult<String> {
    if tags.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_json::to_string(tags)?)
}

fn tags_from_db(value: Option<String>) -> RepoResult<Vec<String>> {
    let text = match value.as_deref().map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(text) => text,
    };

    let tags: Vec<String> = serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags value `{text}` in tasks.tags: {err}"))
    })?;
    Ok(normalize_tags(&tags))
}

fn timestamp_to_db(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, false)
}

fn timestamp_from_db(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, LEGACY_TIMESTAMP_FORMAT))
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| {
            RepoError::InvalidData(format!("invalid timestamp `{value}` in tasks.{column}"))
        })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
