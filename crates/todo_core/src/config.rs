//! Runtime configuration for storage and logging.
//!
//! # Responsibility
//! - Describe which backend to open and where its file lives.
//! - Describe where and how verbosely the core logs.
//!
//! # Invariants
//! - Exactly one storage backend is selected per process.
//! - Backends are chosen here and injected into the service; nothing looks
//!   them up globally.

use crate::logging::default_log_level;
use crate::repo::json_repo::JsonTaskRepository;
use crate::repo::sqlite_repo::SqliteTaskRepository;
use crate::repo::{RepoResult, TaskRepository};
use std::path::{Path, PathBuf};

/// File name used by the JSON backend when no path is given.
pub const DEFAULT_JSON_FILE: &str = "tasks.json";

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Pretty-printed JSON file, fully rewritten on every mutation.
    Json { path: PathBuf },
    /// Single-file SQLite database.
    Sqlite { path: PathBuf },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::Sqlite { .. } => "sqlite",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Json { path } | Self::Sqlite { path } => path,
        }
    }

    /// Opens the selected backend behind the repository contract.
    pub fn open_repository(&self) -> RepoResult<Box<dyn TaskRepository>> {
        let repo: Box<dyn TaskRepository> = match self {
            Self::Json { path } => Box::new(JsonTaskRepository::open(path.clone())?),
            Self::Sqlite { path } => Box::new(SqliteTaskRepository::open(path)?),
        };
        Ok(repo)
    }
}

/// Log sink selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rolling log files in an absolute directory.
    Directory(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    pub target: LogTarget,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            target: LogTarget::Stderr,
        }
    }
}
