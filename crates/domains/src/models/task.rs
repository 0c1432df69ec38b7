use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{double_option, nullable_id};
use super::ids::{ProjectId, TaskId, UserId};
use crate::errors::{DomainError, DomainResult};

/// Board column. Transitions are unrestricted in every direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("Invalid status: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    /// Never changes after creation.
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assignee: Option<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Position on the board; lower sorts first.
    #[serde(default)]
    pub order: f64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from creation input. An unknown or missing status falls
    /// back to `To Do`; an unparseable due date is dropped.
    ///
    /// Assignee membership is checked by the caller, which holds the project.
    pub fn create(input: NewTask, created_by: UserId, order: f64) -> DomainResult<Self> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("Task title is required"));
        }
        let now = Utc::now();
        Ok(Self {
            id: TaskId::new(),
            project_id: input.project_id,
            title: title.to_string(),
            description: input.description.unwrap_or_default(),
            assignee: input.assignee,
            due_date: input.due_date.as_deref().and_then(parse_due_date),
            status: input
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            order,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies the fields present in `patch`. `project_id` is not patchable.
    pub fn apply(&mut self, patch: TaskPatch) -> DomainResult<()> {
        let status = patch.status.as_deref().map(str::parse::<TaskStatus>).transpose()?;
        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(DomainError::validation("Task title cannot be empty"));
            }
            self.title = title.to_string();
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(description) = patch.description {
            self.description = description.unwrap_or_default();
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        match patch.due_date {
            Some(None) => self.due_date = None,
            Some(Some(raw)) if raw.trim().is_empty() => self.due_date = None,
            Some(Some(raw)) => {
                if let Some(due) = parse_due_date(&raw) {
                    self.due_date = Some(due);
                }
            }
            None => {}
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub project_id: ProjectId,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub assignee: Option<UserId>,
    pub due_date: Option<String>,
    pub status: Option<String>,
}

/// Partial task update. For the nullable fields an absent key leaves the
/// value alone and an explicit `null` or empty string clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_id")]
    pub assignee: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    pub status: Option<String>,
}

/// One drag-and-drop position update as sent by a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderEntry {
    pub id: TaskId,
    pub order: f64,
    pub status: Option<String>,
}

/// A validated position update, ready to be written in a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskPosition {
    pub id: TaskId,
    pub order: f64,
    pub status: Option<TaskStatus>,
}

impl TryFrom<ReorderEntry> for TaskPosition {
    type Error = DomainError;

    fn try_from(entry: ReorderEntry) -> Result<Self, Self::Error> {
        if !entry.order.is_finite() {
            return Err(DomainError::validation("Task order must be a finite number"));
        }
        Ok(Self {
            id: entry.id,
            order: entry.order,
            status: entry.status.as_deref().map(str::parse).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            project_id: ProjectId::new(),
            title: title.into(),
            description: None,
            assignee: None,
            due_date: None,
            status: None,
        }
    }

    #[test]
    fn create_applies_defaults() {
        let mut input = new_task("Write docs");
        input.status = Some("Blocked".into());
        input.due_date = Some("next tuesday".into());

        let task = Task::create(input, UserId::new(), 0.0).unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.due_date, None);
        assert_eq!(task.description, "");
    }

    #[test]
    fn create_rejects_blank_title() {
        let err = Task::create(new_task("  "), UserId::new(), 0.0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn due_date_formats() {
        assert!(parse_due_date("2025-03-01").is_some());
        assert!(parse_due_date("2025-03-01T10:00:00.000Z").is_some());
        assert!(parse_due_date("03/01/2025").is_none());
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let mut task = Task::create(new_task("A"), UserId::new(), 0.0).unwrap();
        task.assignee = Some(UserId::new());
        task.description = "keep".into();

        let patch: TaskPatch = serde_json::from_value(json!({ "assignee": null })).unwrap();
        task.apply(patch).unwrap();
        assert_eq!(task.assignee, None);
        assert_eq!(task.description, "keep");
    }

    #[test]
    fn patch_rejects_unknown_status_and_keeps_due_date_on_garbage() {
        let mut task = Task::create(new_task("A"), UserId::new(), 0.0).unwrap();
        task.due_date = parse_due_date("2025-01-01");

        let patch: TaskPatch = serde_json::from_value(json!({ "dueDate": "soon" })).unwrap();
        task.apply(patch).unwrap();
        assert_eq!(task.due_date, parse_due_date("2025-01-01"));

        let patch: TaskPatch = serde_json::from_value(json!({ "status": "Later" })).unwrap();
        assert!(task.apply(patch).is_err());
    }

    #[test]
    fn patch_treats_empty_strings_as_clears() {
        let mut task = Task::create(new_task("A"), UserId::new(), 0.0).unwrap();
        task.assignee = Some(UserId::new());
        task.due_date = parse_due_date("2030-01-15");
        task.description = "keep".into();

        let patch: TaskPatch =
            serde_json::from_value(json!({ "assignee": "", "dueDate": "  ", "description": "" }))
                .unwrap();
        task.apply(patch).unwrap();
        assert_eq!(task.assignee, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.description, "");
    }

    #[test]
    fn patch_still_rejects_malformed_assignee() {
        let res: Result<TaskPatch, _> = serde_json::from_value(json!({ "assignee": "not-an-id" }));
        assert!(res.is_err());

        let id = UserId::new();
        let patch: TaskPatch = serde_json::from_value(json!({ "assignee": id.to_string() })).unwrap();
        assert_eq!(patch.assignee, Some(Some(id)));
    }

    #[test]
    fn status_uses_board_labels_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        assert_eq!("Done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
    }
}
