use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use todo_core::{
    default_log_level, LogTarget, LoggingConfig, Priority, StorageConfig, TaskId,
    DEFAULT_JSON_FILE,
};

/// Top-level CLI parser for the `todo` binary.
#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Small task list stored in a JSON file or SQLite")]
pub struct Cli {
    #[command(flatten)]
    pub storage: StorageArgs,

    /// JSON file name (only valid with --json)
    #[arg(
        long,
        value_name = "PATH",
        default_value = DEFAULT_JSON_FILE,
        conflicts_with = "sqlite"
    )]
    pub file: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Write rolling log files to this directory instead of stderr
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Mutually exclusive backend selection.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct StorageArgs {
    /// Use a JSON file for persistence
    #[arg(long)]
    pub json: bool,

    /// Path to SQLite file for persistence
    #[arg(long, value_name = "PATH")]
    pub sqlite: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add a new task
    Add(AddArgs),
    /// List all tasks
    List,
    /// Mark a task as completed
    Complete {
        #[arg(value_parser = task_id_parser())]
        id: TaskId,
    },
    /// Delete a task
    Delete {
        #[arg(value_parser = task_id_parser())]
        id: TaskId,
    },
    /// Edit title, completion, priority or tags of a task
    Edit(EditArgs),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Task priority: low, medium, high (default: medium)
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Comma-separated list of tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(value_parser = task_id_parser())]
    pub id: TaskId,

    /// New title for the task
    #[arg(long)]
    pub title: Option<String>,

    /// Set completed status: true or false
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub set_completed: Option<bool>,

    /// New priority: low, medium, high
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Replace tags with this comma-separated list
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

impl Cli {
    /// Resolves the selected backend. clap guarantees exactly one flag.
    pub fn storage_config(&self) -> StorageConfig {
        match &self.storage.sqlite {
            Some(path) => StorageConfig::Sqlite { path: path.clone() },
            None => StorageConfig::Json {
                path: self.file.clone(),
            },
        }
    }

    /// Logs go to stderr at `warn` unless a log directory is given, which
    /// switches to files at the build's default level.
    pub fn logging_config(&self) -> std::io::Result<LoggingConfig> {
        let (target, fallback_level) = match &self.log_dir {
            Some(dir) if dir.is_absolute() => (LogTarget::Directory(dir.clone()), default_log_level()),
            Some(dir) => (
                LogTarget::Directory(std::env::current_dir()?.join(dir)),
                default_log_level(),
            ),
            None => (LogTarget::Stderr, "warn"),
        };

        Ok(LoggingConfig {
            level: self
                .log_level
                .clone()
                .unwrap_or_else(|| fallback_level.to_string()),
            target,
        })
    }
}

fn task_id_parser() -> clap::builder::RangedI64ValueParser<TaskId> {
    clap::value_parser!(i64).range(1..)
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| {
        let expected: Vec<&str> = Priority::ALL.iter().map(|p| p.as_str()).collect();
        format!("expected one of {}", expected.join(", "))
    })
}
