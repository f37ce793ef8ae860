use chrono::Utc;
use std::fs;
use todo_core::{JsonTaskRepository, Priority, RepoError, Task, TaskRepository};

fn new_task(title: &str) -> Task {
    Task::new(title, Priority::High, &["Work"], Utc::now())
}

#[test]
fn crud_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = JsonTaskRepository::open(dir.path().join("tasks.json")).unwrap();

    let mut task = new_task("Test");
    let id = repo.create(&mut task).unwrap();
    assert_eq!(id, 1);
    assert_eq!(task.id, 1);
    assert_eq!(repo.get_all().unwrap().len(), 1);

    let fetched = repo.get_by_id(id).unwrap();
    assert_eq!(fetched.title, "Test");
    assert_eq!(fetched.tags, vec!["work".to_string()]);

    task.title = "Updated".to_string();
    repo.update(&task).unwrap();
    assert_eq!(repo.get_by_id(id).unwrap().title, "Updated");

    repo.delete(id).unwrap();
    assert!(matches!(repo.get_by_id(id), Err(RepoError::NotFound(1))));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn missing_file_opens_empty_and_is_not_created_until_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let mut repo = JsonTaskRepository::open(&path).unwrap();
    assert!(repo.get_all().unwrap().is_empty());
    assert!(!path.exists());

    repo.create(&mut new_task("first")).unwrap();
    assert!(path.exists());
}

#[test]
fn mutations_rewrite_file_as_indented_json_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut repo = JsonTaskRepository::open(&path).unwrap();

    repo.create(&mut new_task("a")).unwrap();
    repo.create(&mut new_task("b")).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("[\n  {"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["id"], 2);
    assert_eq!(items[1]["title"], "b");
    assert_eq!(items[1]["priority"], "high");
    assert_eq!(items[1]["tags"], serde_json::json!(["work"]));
}

#[test]
fn reopening_sees_persisted_tasks_and_continues_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    {
        let mut repo = JsonTaskRepository::open(&path).unwrap();
        repo.create(&mut new_task("a")).unwrap();
        repo.create(&mut new_task("b")).unwrap();
    }

    let mut repo = JsonTaskRepository::open(&path).unwrap();
    assert_eq!(repo.get_all().unwrap().len(), 2);
    let id = repo.create(&mut new_task("c")).unwrap();
    assert_eq!(id, 3);
}

#[test]
fn update_and_delete_of_missing_id_return_not_found_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let mut repo = JsonTaskRepository::open(&path).unwrap();
    repo.create(&mut new_task("keep")).unwrap();
    let before = fs::read(&path).unwrap();

    let mut ghost = new_task("ghost");
    ghost.id = 42;
    assert!(matches!(repo.update(&ghost), Err(RepoError::NotFound(42))));
    assert!(matches!(repo.delete(42), Err(RepoError::NotFound(42))));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn malformed_file_is_reported_instead_of_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(&path, "[{\"id\": 1, \"title\": ").unwrap();

    let err = JsonTaskRepository::open(&path).unwrap_err();
    assert!(matches!(err, RepoError::Json(_)));
    assert!(err.is_persistence());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"id\": 1, \"title\": ");
}

#[test]
fn blank_and_null_files_open_empty() {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in [("blank.json", "  \n"), ("null.json", "null")] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let repo = JsonTaskRepository::open(&path).unwrap();
        assert!(repo.get_all().unwrap().is_empty());
    }
}

#[test]
fn legacy_file_is_read_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    fs::write(
        &path,
        r#"[
  {
    "id": 3,
    "title": "from an older release",
    "completed": false,
    "priority": "",
    "created_at": "2024-05-02T10:00:00.123456-03:00",
    "updated_at": "2024-05-02T10:00:00.123456-03:00"
  }
]"#,
    )
    .unwrap();

    let mut repo = JsonTaskRepository::open(&path).unwrap();
    let task = repo.get_by_id(3).unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert!(task.tags.is_empty());

    let id = repo.create(&mut new_task("next")).unwrap();
    assert_eq!(id, 4);
}

#[test]
fn create_fails_cleanly_when_id_space_is_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");
    let seeded = format!(
        r#"[
  {{
    "id": {},
    "title": "last",
    "completed": false,
    "priority": "low",
    "tags": [],
    "created_at": "2026-01-10T12:00:00+00:00",
    "updated_at": "2026-01-10T12:00:00+00:00"
  }}
]"#,
        i64::MAX
    );
    fs::write(&path, &seeded).unwrap();

    let mut repo = JsonTaskRepository::open(&path).unwrap();
    let mut task = new_task("one too many");
    let err = repo.create(&mut task).unwrap_err();

    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("exhausted")));
    assert!(err.is_persistence());
    assert_eq!(task.id, 0);
    assert_eq!(repo.get_all().unwrap().len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), seeded);
}
