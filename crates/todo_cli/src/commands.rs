//! Command handlers: one service call (or a short sequence for `edit`) per
//! invocation, plus the user-facing output.

use crate::cli::{AddArgs, Commands, EditArgs};
use anyhow::Context;
use std::io::Write;
use todo_core::{EditTaskRequest, Task, TaskRepository, TaskService};

/// Executes one parsed command against the service, writing confirmations
/// and listings to `out`.
pub fn dispatch<R, W>(command: &Commands, service: &mut TaskService<R>, out: &mut W) -> anyhow::Result<()>
where
    R: TaskRepository,
    W: Write,
{
    match command {
        Commands::Add(args) => add(args, service, out),
        Commands::List => list(service, out),
        Commands::Complete { id } => {
            service.complete(*id)?;
            writeln!(out, "Task {id} marked as completed")?;
            Ok(())
        }
        Commands::Delete { id } => {
            service.delete(*id)?;
            writeln!(out, "Task {id} deleted successfully")?;
            Ok(())
        }
        Commands::Edit(args) => edit(args, service, out),
    }
}

fn add<R: TaskRepository, W: Write>(
    args: &AddArgs,
    service: &mut TaskService<R>,
    out: &mut W,
) -> anyhow::Result<()> {
    let priority = args.priority.map_or("", |priority| priority.as_str());
    let task = service.add(&args.title, priority, &args.tags)?;
    writeln!(out, "Task added successfully (id {})", task.id)?;
    Ok(())
}

fn list<R: TaskRepository, W: Write>(service: &TaskService<R>, out: &mut W) -> anyhow::Result<()> {
    for task in service.list()? {
        write_task(&task, out)?;
    }
    Ok(())
}

// Priority and tags are applied after the title/completion edit; clap has
// already rejected invalid priorities, so a failure here is a storage error.
fn edit<R: TaskRepository, W: Write>(
    args: &EditArgs,
    service: &mut TaskService<R>,
    out: &mut W,
) -> anyhow::Result<()> {
    let request = EditTaskRequest {
        title: args.title.clone(),
        completed: args.set_completed,
    };
    service.edit(args.id, &request)?;

    if let Some(priority) = args.priority {
        service
            .update_priority(args.id, priority.as_str())
            .context("error updating priority")?;
    }

    if let Some(tags) = &args.tags {
        service
            .update_tags(args.id, tags)
            .context("error updating tags")?;
    }

    writeln!(out, "Task {} edited successfully", args.id)?;
    Ok(())
}

fn write_task<W: Write>(task: &Task, out: &mut W) -> std::io::Result<()> {
    let tags = if task.tags.is_empty() {
        "no tags".to_string()
    } else {
        task.tags.join(", ")
    };
    writeln!(out, "[{}] {}", task.id, task.title)?;
    writeln!(out, "\tStatus: {}", task.status_label())?;
    writeln!(out, "\tPriority: {}", task.priority)?;
    writeln!(out, "\tTags: {tags}")
}

#[cfg(test)]
mod tests {
    use super::dispatch;
    use crate::cli::Cli;
    use clap::Parser;
    use std::path::Path;
    use todo_core::{JsonTaskRepository, Priority, TaskRepository, TaskService};

    fn run(store: &Path, args: &[&str]) -> anyhow::Result<String> {
        let mut argv = vec!["todo", "--json", "--file", store.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;

        let repo = JsonTaskRepository::open(store)?;
        let mut service = TaskService::new(repo);
        let mut out = Vec::new();
        dispatch(&cli.command, &mut service, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn add_then_list_prints_task_block() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("tasks.json");

        let output = run(&store, &["add", "Buy milk", "--tags", "Food, home"]).unwrap();
        assert_eq!(output, "Task added successfully (id 1)\n");

        let output = run(&store, &["list"]).unwrap();
        assert_eq!(
            output,
            "[1] Buy milk\n\tStatus: pending\n\tPriority: medium\n\tTags: food, home\n"
        );
    }

    #[test]
    fn list_without_tags_says_so() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("tasks.json");

        run(&store, &["add", "plain"]).unwrap();
        let output = run(&store, &["list"]).unwrap();
        assert!(output.contains("\tTags: no tags\n"));
    }

    #[test]
    fn edit_applies_title_completion_priority_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("tasks.json");
        run(&store, &["add", "draft"]).unwrap();

        let output = run(
            &store,
            &[
                "edit",
                "1",
                "--title",
                "final",
                "--set-completed",
                "true",
                "--priority",
                "low",
                "--tags",
                "A,b",
            ],
        )
        .unwrap();
        assert_eq!(output, "Task 1 edited successfully\n");

        let task = JsonTaskRepository::open(&store)
            .unwrap()
            .get_by_id(1)
            .unwrap();
        assert_eq!(task.title, "final");
        assert!(task.completed);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn complete_and_delete_confirm_and_report_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("tasks.json");
        run(&store, &["add", "x"]).unwrap();

        assert_eq!(
            run(&store, &["complete", "1"]).unwrap(),
            "Task 1 marked as completed\n"
        );
        assert_eq!(
            run(&store, &["delete", "1"]).unwrap(),
            "Task 1 deleted successfully\n"
        );

        let err = run(&store, &["delete", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "task with id 1 was not found");
    }
}
