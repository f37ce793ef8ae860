//! `todo` command-line entry point.
//!
//! # Responsibility
//! - Parse flags, pick one storage backend and inject it into the service.
//! - Turn any core error into `Error: ...` on stderr and exit code 1.

use anyhow::Context;
use clap::Parser;
use log::debug;
use todo_core::{init_logging, TaskService};

mod cli;
mod commands;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let logging = cli
        .logging_config()
        .context("failed to resolve log directory")?;
    init_logging(&logging)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let storage = cli.storage_config();
    debug!(
        "event=cli_start module=cli status=ok backend={}",
        storage.backend_name()
    );
    let repo = storage.open_repository().with_context(|| {
        format!(
            "failed to open {} store at {}",
            storage.backend_name(),
            storage.path().display()
        )
    })?;

    let mut service = TaskService::new(repo);
    let stdout = std::io::stdout();
    commands::dispatch(&cli.command, &mut service, &mut stdout.lock())
}
