//! Task domain model.
//!
//! # Responsibility
//! - Define the single record persisted by every storage backend.
//! - Provide priority parsing/defaulting and tag normalization helpers.
//!
//! # Invariants
//! - `id` is assigned by a backend on create and never changes afterwards.
//! - `priority` is always one of `low|medium|high` after any successful write.
//! - `tags` is trimmed, lowercase, sorted and free of blanks and duplicates.
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Backend-assigned task identifier. Persisted ids are always `> 0`.
pub type TaskId = i64;

/// Closed priority enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Every accepted priority, lowest first.
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Parses a priority name. Surrounding whitespace and case are ignored.
    ///
    /// Returns `None` for empty or unknown input.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Parses a priority name, falling back to [`Priority::default`] for
    /// empty or unknown input.
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Stable lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted invariant violations for [`Task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Stored tasks must carry a backend-assigned positive id.
    InvalidId(TaskId),
    /// `updated_at` moved before `created_at`.
    UpdatedBeforeCreated {
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "task id must be positive, got {id}"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({}) must be >= created_at ({})",
                updated_at.to_rfc3339(),
                created_at.to_rfc3339()
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// A single to-do record.
///
/// Deserialization accepts records written before `priority`/`tags` existed:
/// a missing, empty or unknown priority becomes [`Priority::Medium`] and
/// missing or `null` tags become an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `0` until a backend assigns an id on create.
    pub id: TaskId,
    /// Free-form title. Empty titles are allowed.
    pub title: String,
    pub completed: bool,
    #[serde(default, deserialize_with = "deserialize_priority")]
    pub priority: Priority,
    /// Normalized tag list, see [`normalize_tags`].
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds an unsaved task stamped with `now`.
    ///
    /// # Invariants
    /// - `id` is `0` until a repository assigns one.
    /// - `completed` starts as `false`.
    /// - `tags` are normalized.
    pub fn new<S: AsRef<str>>(
        title: impl Into<String>,
        priority: Priority,
        tags: &[S],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            completed: false,
            priority,
            tags: normalize_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`. The timestamp never moves backwards, even if
    /// the wall clock does.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Replaces the tag set with the normalized form of `tags`.
    pub fn set_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.tags = normalize_tags(tags);
    }

    /// Human-readable completion state.
    pub fn status_label(&self) -> &'static str {
        if self.completed {
            "completed"
        } else {
            "pending"
        }
    }

    /// Checks invariants that must hold for every stored task.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id <= 0 {
            return Err(TaskValidationError::InvalidId(self.id));
        }
        self.validate_timestamps()
    }

    /// Checks the timestamp ordering alone. Usable before an id is assigned.
    pub fn validate_timestamps(&self) -> Result<(), TaskValidationError> {
        if self.updated_at < self.created_at {
            return Err(TaskValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Normalizes one tag. Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tag values. Output is sorted.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let unique: BTreeSet<String> = tags
        .iter()
        .filter_map(|tag| normalize_tag(tag.as_ref()))
        .collect();
    unique.into_iter().collect()
}

fn deserialize_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(Priority::parse_or_default)
        .unwrap_or_default())
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(raw.map(|tags| normalize_tags(&tags)).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, Priority, Task, TaskValidationError};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn priority_parse_accepts_known_values_only() {
        assert_eq!(Priority::parse("low"), Some(Priority::Low));
        assert_eq!(Priority::parse(" HIGH "), Some(Priority::High));
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::parse_or_default("bogus"), Priority::Medium);
        assert_eq!(Priority::parse_or_default(""), Priority::Medium);
    }

    #[test]
    fn normalize_tags_trims_lowercases_and_dedupes() {
        let tags = normalize_tags(&["Go", " go ", "Test", "test", ""]);
        assert_eq!(tags, vec!["go".to_string(), "test".to_string()]);
    }

    #[test]
    fn touch_never_moves_updated_at_backwards() {
        let created = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let mut task = Task::new("a", Priority::Low, &[] as &[&str], created);

        task.touch(created - Duration::seconds(30));
        assert_eq!(task.updated_at, created);

        task.touch(created + Duration::seconds(30));
        assert_eq!(task.updated_at, created + Duration::seconds(30));
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn validate_rejects_unassigned_id_and_reversed_timestamps() {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        let mut task = Task::new("a", Priority::Low, &["x"], now);
        assert_eq!(task.validate(), Err(TaskValidationError::InvalidId(0)));

        task.id = 3;
        task.updated_at = now - Duration::seconds(1);
        assert!(matches!(
            task.validate(),
            Err(TaskValidationError::UpdatedBeforeCreated { .. })
        ));
    }
}
