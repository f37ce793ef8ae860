use chrono::{TimeZone, Utc};
use todo_core::{normalize_tags, Priority, Task};

#[test]
fn task_new_sets_defaults() {
    let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
    let task = Task::new("Buy milk", Priority::default(), &[" Food ", "food"], now);

    assert_eq!(task.id, 0);
    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.tags, vec!["food".to_string()]);
    assert_eq!(task.created_at, now);
    assert_eq!(task.updated_at, now);
    assert_eq!(task.status_label(), "pending");
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let now = Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap();
    let mut task = Task::new("ship release", Priority::High, &["work"], now);
    task.id = 4;

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], 4);
    assert_eq!(json["title"], "ship release");
    assert_eq!(json["completed"], false);
    assert_eq!(json["priority"], "high");
    assert_eq!(json["tags"], serde_json::json!(["work"]));
    assert_eq!(json["created_at"], "2026-02-01T09:00:00Z");
    assert_eq!(json["updated_at"], "2026-02-01T09:00:00Z");

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn legacy_records_without_priority_and_tags_get_defaults() {
    let value = serde_json::json!({
        "id": 1,
        "title": "old task",
        "completed": true,
        "created_at": "2024-05-02T10:00:00-03:00",
        "updated_at": "2024-05-02T10:05:00-03:00"
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert!(task.tags.is_empty());
    assert_eq!(
        task.created_at,
        Utc.with_ymd_and_hms(2024, 5, 2, 13, 0, 0).unwrap()
    );
    assert_eq!(task.status_label(), "completed");
}

#[test]
fn blank_or_unknown_priority_and_null_tags_are_tolerated() {
    for priority in ["", "urgent"] {
        let value = serde_json::json!({
            "id": 2,
            "title": "t",
            "completed": false,
            "priority": priority,
            "tags": null,
            "created_at": "2024-05-02T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z"
        });

        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
    }
}

#[test]
fn normalize_tags_behaves_as_a_set() {
    let tags = normalize_tags(&["Go", " go ", "Test", "test", ""]);
    assert_eq!(tags.len(), 2);
    assert!(tags.contains(&"go".to_string()));
    assert!(tags.contains(&"test".to_string()));

    assert!(normalize_tags(&["", "   "]).is_empty());
}
