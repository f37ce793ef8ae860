//! Core domain logic for the task manager.
//! This crate is the single source of truth for task invariants; the CLI only
//! parses input, calls the service and prints results.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{LogTarget, LoggingConfig, StorageConfig, DEFAULT_JSON_FILE};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{
    normalize_tag, normalize_tags, Priority, Task, TaskId, TaskValidationError,
};
pub use repo::json_repo::JsonTaskRepository;
pub use repo::sqlite_repo::SqliteTaskRepository;
pub use repo::{RepoError, RepoResult, TaskRepository};
pub use service::task_service::{
    EditTaskRequest, TaskService, TaskServiceError, TaskServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
