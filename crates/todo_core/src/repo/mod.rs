//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the five-operation storage contract every backend satisfies.
//! - Isolate file and SQL details from service/business orchestration.
//!
//! # Invariants
//! - Backends assign ids on `create`; callers never supply them.
//! - `get_by_id`, `update` and `delete` report a missing id as
//!   `RepoError::NotFound`, identically across backends.
//! - Ids are unique per backend instance and are not reused while a record
//!   with that id is still visible.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
///
/// Everything other than `NotFound` is a persistence failure.
#[derive(Debug)]
pub enum RepoError {
    NotFound(TaskId),
    Validation(TaskValidationError),
    Db(DbError),
    Io(std::io::Error),
    Json(serde_json::Error),
    InvalidData(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for storage I/O, encoding and integrity failures.
    pub fn is_persistence(&self) -> bool {
        !self.is_not_found()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task with id {id} was not found"),
            Self::Validation(err) => write!(f, "invalid task: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "task file i/o failed: {err}"),
            Self::Json(err) => write!(f, "task file is not valid JSON: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Storage contract for tasks.
pub trait TaskRepository {
    /// Returns every task in the backend's natural order.
    fn get_all(&self) -> RepoResult<Vec<Task>>;
    /// Returns one task, or `RepoError::NotFound`.
    fn get_by_id(&self, id: TaskId) -> RepoResult<Task>;
    /// Persists a new task. The assigned id is written into `task` and
    /// also returned.
    fn create(&mut self, task: &mut Task) -> RepoResult<TaskId>;
    /// Replaces the stored record with the same id.
    fn update(&mut self, task: &Task) -> RepoResult<()>;
    /// Permanently removes one task.
    fn delete(&mut self, id: TaskId) -> RepoResult<()>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for &mut R {
    fn get_all(&self) -> RepoResult<Vec<Task>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Task> {
        (**self).get_by_id(id)
    }

    fn create(&mut self, task: &mut Task) -> RepoResult<TaskId> {
        (**self).create(task)
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        (**self).update(task)
    }

    fn delete(&mut self, id: TaskId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn get_all(&self) -> RepoResult<Vec<Task>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Task> {
        (**self).get_by_id(id)
    }

    fn create(&mut self, task: &mut Task) -> RepoResult<TaskId> {
        (**self).create(task)
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        (**self).update(task)
    }

    fn delete(&mut self, id: TaskId) -> RepoResult<()> {
        (**self).delete(id)
    }
}
