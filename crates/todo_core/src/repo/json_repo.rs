//! JSON file task repository.
//!
//! # Responsibility
//! - Keep an owned in-memory mirror of all tasks loaded once at open time.
//! - Rewrite the whole file after every successful mutation.
//!
//! # Invariants
//! - The in-memory mirror only changes when the matching file rewrite
//!   succeeds; a failed write rolls the mirror back.
//! - New ids are `max(existing ids) + 1`. Create fails once that would
//!   overflow `i64`.
//! - A missing or unreadable file opens as an empty store; malformed JSON is
//!   reported as `RepoError::Json` instead of being discarded.
//!
//! # Limitations
//! - Rewrites go straight to the target path. A crash mid-write can leave a
//!   truncated file behind.
//! - Concurrent processes are not coordinated: each one works on the snapshot
//!   it loaded, and the last writer wins.

use crate::model::task::{Task, TaskId};
use crate::repo::{RepoError, RepoResult, TaskRepository};
use log::{debug, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Task repository mirrored to a single pretty-printed JSON file.
#[derive(Debug)]
pub struct JsonTaskRepository {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl JsonTaskRepository {
    /// Loads the store at `path`. The file is not created until the first
    /// mutation.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        let tasks = load_tasks(&path)?;
        info!(
            "event=repo_open module=repo.json status=ok count={}",
            tasks.len()
        );
        Ok(Self { path, tasks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn next_id(&self) -> RepoResult<TaskId> {
        let highest = self.tasks.iter().map(|task| task.id).max().unwrap_or(0);
        highest
            .checked_add(1)
            .ok_or_else(|| RepoError::InvalidData("task id space exhausted".to_string()))
    }

    fn save(&self) -> RepoResult<()> {
        let mut data = serde_json::to_vec_pretty(&self.tasks)?;
        data.push(b'\n');
        fs::write(&self.path, data)?;
        debug!(
            "event=repo_save module=repo.json status=ok count={}",
            self.tasks.len()
        );
        Ok(())
    }
}

impl TaskRepository for JsonTaskRepository {
    fn get_all(&self) -> RepoResult<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn get_by_id(&self, id: TaskId) -> RepoResult<Task> {
        self.position(id)
            .map(|index| self.tasks[index].clone())
            .ok_or(RepoError::NotFound(id))
    }

    fn create(&mut self, task: &mut Task) -> RepoResult<TaskId> {
        let id = self.next_id()?;
        let mut stored = task.clone();
        stored.id = id;
        stored.validate()?;

        self.tasks.push(stored);
        if let Err(err) = self.save() {
            self.tasks.pop();
            return Err(err);
        }

        task.id = id;
        info!("event=task_create module=repo.json status=ok id={id}");
        Ok(id)
    }

    fn update(&mut self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let index = self.position(task.id).ok_or(RepoError::NotFound(task.id))?;

        let previous = std::mem::replace(&mut self.tasks[index], task.clone());
        if let Err(err) = self.save() {
            self.tasks[index] = previous;
            return Err(err);
        }

        info!("event=task_update module=repo.json status=ok id={}", task.id);
        Ok(())
    }

    fn delete(&mut self, id: TaskId) -> RepoResult<()> {
        let index = self.position(id).ok_or(RepoError::NotFound(id))?;

        let removed = self.tasks.remove(index);
        if let Err(err) = self.save() {
            self.tasks.insert(index, removed);
            return Err(err);
        }

        info!("event=task_delete module=repo.json status=ok id={id}");
        Ok(())
    }
}

fn load_tasks(path: &Path) -> RepoResult<Vec<Task>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            warn!(
                "event=repo_open module=repo.json status=degraded error_code=file_unreadable error={err}"
            );
            return Ok(Vec::new());
        }
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    // `null` is what an empty list looked like in files from older releases.
    let tasks = serde_json::from_slice::<Option<Vec<Task>>>(&data)?.unwrap_or_default();
    for task in &tasks {
        task.validate()?;
    }
    Ok(tasks)
}
