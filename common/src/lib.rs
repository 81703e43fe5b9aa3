// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted lifecycle state of a task. Only two values exist; the richer
/// label shown to users is derived at read time (see [`display_status`]).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Todo,
    Done,
}

impl TaskStatus {
    /// Parses the wire representation ("TODO" / "DONE"). Anything else is
    /// `None`; callers decide whether that is an error or simply ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TODO" => Some(TaskStatus::Todo),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "TODO"),
            TaskStatus::Done => write!(f, "DONE"),
        }
    }
}

/// Read-time status label. Never persisted and never serialized in task
/// responses; the UI recomputes it from `status` + `deadline` so the label
/// cannot go stale between fetch and render.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Achieved,
    Failed,
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayStatus::InProgress => write!(f, "In Progress"),
            DisplayStatus::Done => write!(f, "Done"),
            DisplayStatus::Achieved => write!(f, "Achieved"),
            DisplayStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Derives the display label from the stored status and the deadline.
///
/// `now` is an explicit parameter so the rule stays deterministic under
/// test. The comparisons are intentionally asymmetric: a DONE task whose
/// deadline has strictly passed is Achieved (done exactly at the deadline
/// is still Done), while a TODO task is Failed from the deadline instant
/// onwards. Do not unify the two comparisons.
pub fn display_status(
    status: TaskStatus,
    deadline: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DisplayStatus {
    if status == TaskStatus::Done && now > deadline {
        return DisplayStatus::Achieved;
    }
    if status == TaskStatus::Done {
        return DisplayStatus::Done;
    }
    if now >= deadline {
        return DisplayStatus::Failed;
    }
    DisplayStatus::InProgress
}

/// The full task record as stored, including the raw attachment bytes.
/// This shape never crosses the HTTP boundary directly; responses use
/// [`TaskView`] instead (the file download endpoint streams the bytes
/// with their own headers).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
    pub file_data: Option<Vec<u8>>,
    pub file_content_type: Option<String>,
    pub file_name: Option<String>,
}

/// An uploaded PDF held entirely in memory. Captured from the multipart
/// request and handed to the store verbatim; never written to disk.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Creation payload handed from the service to the store. `status` is not
/// part of it: new tasks are always TODO regardless of client input.
#[derive(Debug)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
    pub file: Option<Attachment>,
}

/// Attachment metadata exposed in sanitized responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub filename: String,
    pub content_type: String,
}

/// Sanitized task shape returned by every endpoint except the file
/// download: the binary payload is stripped and replaced with a `hasFile`
/// flag plus name/type metadata.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: DateTime<Utc>,
    pub created_on: DateTime<Utc>,
    pub has_file: bool,
    pub linked_file: Option<FileMeta>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        let has_file = task.file_data.is_some();
        TaskView {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            deadline: task.deadline,
            created_on: task.created_on,
            has_file,
            linked_file: has_file.then(|| FileMeta {
                filename: task
                    .file_name
                    .clone()
                    .unwrap_or_else(|| "file.pdf".to_string()),
                content_type: task
                    .file_content_type
                    .clone()
                    .unwrap_or_else(|| "application/pdf".to_string()),
            }),
        }
    }
}
