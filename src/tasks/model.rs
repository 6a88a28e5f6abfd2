use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::RecordId;
use crate::schema::{self, lenient_date, lenient_timestamp, Field, FieldAlias};

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Column order on the board.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown task status {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

/// A unit of work inside a project, as stored by the record service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Title_c", default)]
    pub title: String,
    #[serde(rename = "Description_c", default)]
    pub description: Option<String>,
    #[serde(rename = "Status_c")]
    pub status: TaskStatus,
    #[serde(rename = "Priority_c", default)]
    pub priority: Priority,
    #[serde(rename = "project_c")]
    pub project: RecordId,
    #[serde(rename = "Assigned_To_c", default)]
    pub assignee: Option<RecordId>,
    #[serde(rename = "Due_Date_c", default, with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "CreatedOn", default, with = "lenient_timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(rename = "ModifiedOn", default, with = "lenient_timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

pub const TASK_ALIASES: &[FieldAlias] = &[
    FieldAlias { canonical: "Title_c", legacy: "title" },
    FieldAlias { canonical: "Description_c", legacy: "description" },
    FieldAlias { canonical: "Status_c", legacy: "status" },
    FieldAlias { canonical: "Priority_c", legacy: "priority" },
    FieldAlias { canonical: "project_c", legacy: "projectId" },
    FieldAlias { canonical: "Assigned_To_c", legacy: "assigneeId" },
    FieldAlias { canonical: "Due_Date_c", legacy: "dueDate" },
];

/// Writable task attributes. Absent fields are left untouched on update;
/// `Field::Null` on `assignee` unassigns the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    #[serde(rename = "Title_c", default, skip_serializing_if = "Field::is_absent")]
    pub title: Field<String>,
    #[serde(rename = "Description_c", default, skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(rename = "Status_c", default, skip_serializing_if = "Field::is_absent")]
    pub status: Field<TaskStatus>,
    #[serde(rename = "Priority_c", default, skip_serializing_if = "Field::is_absent")]
    pub priority: Field<Priority>,
    #[serde(rename = "project_c", default, skip_serializing_if = "Field::is_absent")]
    pub project: Field<RecordId>,
    #[serde(rename = "Assigned_To_c", default, skip_serializing_if = "Field::is_absent")]
    pub assignee: Field<RecordId>,
    #[serde(rename = "Due_Date_c", default, skip_serializing_if = "Field::is_absent")]
    pub due_date: Field<NaiveDate>,
}

impl TaskInput {
    /// Accepts legacy (`title`, `projectId`, ...) or canonical (`Title_c`,
    /// `project_c`, ...) names.
    pub fn from_json(input: &Value) -> Result<Self, serde_json::Error> {
        schema::from_loose(input, TASK_ALIASES)
    }

    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Field::Value(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("in-progress"));
        assert_eq!("done".parse::<TaskStatus>(), Ok(TaskStatus::Done));
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_decodes_lookup_references_and_blank_dates() {
        let task: Task = serde_json::from_value(json!({
            "Id": 7,
            "Title_c": "Write docs",
            "Status_c": "todo",
            "Priority_c": "high",
            "project_c": {"Id": 1, "Name": "Website"},
            "Assigned_To_c": {"Id": 3, "Name": "Ada"},
            "Due_Date_c": "",
            "CreatedOn": "2024-05-01T09:30:00"
        }))
        .unwrap();
        assert_eq!(task.project, RecordId(1));
        assert_eq!(task.assignee, Some(RecordId(3)));
        assert_eq!(task.due_date, None);
        assert!(task.created_on.is_some());
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn test_task_with_unknown_status_is_rejected() {
        let result = serde_json::from_value::<Task>(json!({
            "Id": 1, "Status_c": "blocked", "project_c": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_input_from_form_strings() {
        let input = TaskInput::from_json(&json!({
            "title": "Fix login",
            "projectId": "4",
            "assigneeId": null,
            "dueDate": "2024-06-30"
        }))
        .unwrap();
        assert_eq!(input.project, Field::Value(RecordId(4)));
        assert_eq!(input.assignee, Field::Null);
        assert_eq!(input.status, Field::Absent);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "Title_c": "Fix login",
                "project_c": 4,
                "Assigned_To_c": null,
                "Due_Date_c": "2024-06-30"
            })
        );
    }
}
