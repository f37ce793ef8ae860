//! Task use-case service.
//!
//! # Responsibility
//! - Provide the task use-cases (list, lookup, add, complete, edit,
//!   priority/tag updates, delete) over an injected repository.
//! - Own defaulting, normalization and timestamping rules.
//!
//! # Invariants
//! - The service stays storage-agnostic; it only sees `TaskRepository`.
//! - Validation failures are raised before any repository access.
//! - Every mutation is a single fetch-modify-write round trip and refreshes
//!   `updated_at`. There is no optimistic-concurrency check.

use crate::model::task::{Priority, Task, TaskId};
use crate::repo::{RepoError, TaskRepository};
use chrono::Utc;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Priority is not one of `low|medium|high`.
    InvalidPriority(String),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPriority(value) => write!(
                f,
                "invalid priority `{value}`; expected one of low, medium, high"
            ),
            Self::TaskNotFound(id) => write!(f, "task with id {id} was not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Partial edit of title and completion state.
///
/// `None` leaves a field untouched; an empty title also counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTaskRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Use-case service for task operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the injected repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Lists all tasks in backend order.
    pub fn list(&self) -> TaskServiceResult<Vec<Task>> {
        Ok(self.repo.get_all()?)
    }

    /// Looks up one task by id.
    pub fn get(&self, id: TaskId) -> TaskServiceResult<Task> {
        Ok(self.repo.get_by_id(id)?)
    }

    /// Creates a pending task and returns it with its assigned id.
    ///
    /// # Contract
    /// - Empty or unknown `priority` falls back to `medium`; never an error.
    /// - `tags` are normalized.
    /// - Empty titles are accepted.
    pub fn add<S: AsRef<str>>(
        &mut self,
        title: &str,
        priority: &str,
        tags: &[S],
    ) -> TaskServiceResult<Task> {
        let mut task = Task::new(title, Priority::parse_or_default(priority), tags, Utc::now());
        let id = self.repo.create(&mut task)?;
        info!(
            "event=task_add module=service status=ok id={id} priority={} tag_count={}",
            task.priority,
            task.tags.len()
        );
        Ok(task)
    }

    /// Marks a task as completed.
    pub fn complete(&mut self, id: TaskId) -> TaskServiceResult<Task> {
        let task = self.modify(id, |task| task.completed = true)?;
        info!("event=task_complete module=service status=ok id={id}");
        Ok(task)
    }

    /// Applies a partial edit. An edit with no fields still refreshes
    /// `updated_at` and writes the task back.
    pub fn edit(&mut self, id: TaskId, request: &EditTaskRequest) -> TaskServiceResult<Task> {
        let task = self.modify(id, |task| {
            if let Some(title) = request.title.as_deref().filter(|title| !title.is_empty()) {
                task.title = title.to_string();
            }
            if let Some(completed) = request.completed {
                task.completed = completed;
            }
        })?;
        info!(
            "event=task_edit module=service status=ok id={id} title_changed={} completed_changed={}",
            request.title.as_deref().is_some_and(|title| !title.is_empty()),
            request.completed.is_some()
        );
        Ok(task)
    }

    /// Sets the priority of a task.
    ///
    /// Unlike [`TaskService::add`], an unknown priority is rejected with
    /// `InvalidPriority` before the store is touched.
    pub fn update_priority(&mut self, id: TaskId, priority: &str) -> TaskServiceResult<Task> {
        let priority = Priority::parse(priority)
            .ok_or_else(|| TaskServiceError::InvalidPriority(priority.to_string()))?;
        let task = self.modify(id, |task| task.priority = priority)?;
        info!("event=task_priority module=service status=ok id={id} priority={priority}");
        Ok(task)
    }

    /// Replaces the tag set of a task with the normalized `tags`.
    pub fn update_tags<S: AsRef<str>>(&mut self, id: TaskId, tags: &[S]) -> TaskServiceResult<Task> {
        let task = self.modify(id, |task| task.set_tags(tags))?;
        info!(
            "event=task_tags module=service status=ok id={id} tag_count={}",
            task.tags.len()
        );
        Ok(task)
    }

    /// Permanently deletes a task.
    pub fn delete(&mut self, id: TaskId) -> TaskServiceResult<()> {
        self.repo.delete(id)?;
        info!("event=task_delete module=service status=ok id={id}");
        Ok(())
    }

    fn modify<F>(&mut self, id: TaskId, change: F) -> TaskServiceResult<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut task = self.repo.get_by_id(id)?;
        change(&mut task);
        task.touch(Utc::now());
        self.repo.update(&task)?;
        Ok(task)
    }
}
