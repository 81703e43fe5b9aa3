// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::database;
use crate::error::ApiError;
use crate::upload::TaskForm;
use crate::validate;

use chrono::Utc;
use common::{NewTask, TaskStatus, TaskView};
use sqlx::SqlitePool;
use tracing::info;

const TASK_NOT_FOUND: &str = "Task not found";

/// Raw attachment handed to the download endpoint. This is the only path
/// on which file bytes leave the service.
#[derive(Debug)]
pub struct FileDownload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

/// Owns the task business rules: field validation, the TODO/DONE
/// lifecycle, and response sanitization. Every operation re-reads from the
/// store; nothing is cached across requests.
#[derive(Clone)]
pub struct TaskService {
    pool: SqlitePool,
}

impl TaskService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks, most recently created first, sanitized.
    pub async fn list(&self) -> Result<Vec<TaskView>, ApiError> {
        let tasks = database::list_tasks_from_db(&self.pool).await?;
        Ok(tasks.iter().map(TaskView::from).collect())
    }

    /// A single sanitized task.
    pub async fn get(&self, id: i64) -> Result<TaskView, ApiError> {
        let task = database::get_task_from_db(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;
        Ok(TaskView::from(&task))
    }

    /// The raw attachment bytes with their metadata. A missing task and a
    /// task without an attachment are both NotFound, distinguished only by
    /// message.
    pub async fn get_file(&self, id: i64) -> Result<FileDownload, ApiError> {
        let task = database::get_task_from_db(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;

        let data = task
            .file_data
            .ok_or_else(|| ApiError::not_found("No file attached to this task"))?;

        Ok(FileDownload {
            data,
            content_type: task
                .file_content_type
                .unwrap_or_else(|| "application/pdf".to_string()),
            filename: task.file_name.unwrap_or_else(|| "file.pdf".to_string()),
        })
    }

    /// Creates a task. Status is forced to TODO and `created_on` to now,
    /// regardless of what the client sent. The attachment, when present,
    /// has already passed the PDF/size filter in the upload layer.
    pub async fn create(&self, form: TaskForm) -> Result<TaskView, ApiError> {
        let title = form.title.unwrap_or_default();
        let description = form.description.unwrap_or_default();
        let deadline_raw = form.deadline.unwrap_or_default();

        if title.is_empty() || description.is_empty() || deadline_raw.is_empty() {
            return Err(ApiError::MissingFields);
        }

        let mut violations = Vec::new();
        violations.extend(validate::TITLE.check(&title));
        violations.extend(validate::DESCRIPTION.check(&description));
        let deadline = validate::parse_deadline(&deadline_raw);
        if deadline.is_none() {
            violations.push(validate::DEADLINE_VIOLATION.to_string());
        }

        match (deadline, violations.is_empty()) {
            (Some(deadline), true) => {
                let task = database::insert_task_in_db(
                    &self.pool,
                    NewTask {
                        title: title.trim().to_string(),
                        description: description.trim().to_string(),
                        deadline,
                        created_on: Utc::now(),
                        file: form.file,
                    },
                )
                .await?;
                info!("Task created successfully with ID: {}", task.id);
                Ok(TaskView::from(&task))
            }
            _ => Err(ApiError::validation(violations)),
        }
    }

    /// Partially updates a task. A field left empty in the form is left
    /// unchanged; an unknown status value is silently ignored; a new file
    /// fully replaces any previous attachment. Nothing is persisted when
    /// any supplied field fails validation.
    pub async fn update(&self, id: i64, form: TaskForm) -> Result<TaskView, ApiError> {
        let mut task = database::get_task_from_db(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;

        let mut violations = Vec::new();

        if let Some(title) = non_empty(form.title) {
            match validate::TITLE.check(&title) {
                Some(violation) => violations.push(violation),
                None => task.title = title.trim().to_string(),
            }
        }
        if let Some(description) = non_empty(form.description) {
            match validate::DESCRIPTION.check(&description) {
                Some(violation) => violations.push(violation),
                None => task.description = description.trim().to_string(),
            }
        }
        if let Some(raw) = non_empty(form.deadline) {
            match validate::parse_deadline(&raw) {
                Some(deadline) => task.deadline = deadline,
                None => violations.push(validate::DEADLINE_VIOLATION.to_string()),
            }
        }
        if let Some(raw) = non_empty(form.status) {
            // Values outside the enum are ignored rather than rejected.
            if let Some(status) = TaskStatus::parse(&raw) {
                task.status = status;
            }
        }

        if !violations.is_empty() {
            return Err(ApiError::validation(violations));
        }

        if let Some(file) = form.file {
            task.file_data = Some(file.data);
            task.file_content_type = Some(file.content_type);
            task.file_name = Some(file.filename);
        }

        database::update_task_in_db(&self.pool, &task).await?;
        info!("Task with ID {} updated successfully.", task.id);
        Ok(TaskView::from(&task))
    }

    /// Forces the status to DONE. Every other field is left untouched.
    pub async fn mark_done(&self, id: i64) -> Result<TaskView, ApiError> {
        let mut task = database::get_task_from_db(&self.pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;

        task.status = TaskStatus::Done;
        database::update_task_in_db(&self.pool, &task).await?;
        info!("Task with ID {} marked as done.", task.id);
        Ok(TaskView::from(&task))
    }

    /// Permanently deletes a task.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let deleted = database::delete_task_from_db(&self.pool, id).await?;
        if !deleted {
            return Err(ApiError::not_found(TASK_NOT_FOUND));
        }
        info!("Task with ID {} deleted successfully.", id);
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_tasks_table;
    use common::Attachment;

    async fn setup_service() -> TaskService {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_tasks_table(&pool).await.unwrap();
        TaskService::new(pool)
    }

    fn create_form(title: &str, description: &str, deadline: &str) -> TaskForm {
        TaskForm {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            deadline: Some(deadline.to_string()),
            status: None,
            file: None,
        }
    }

    fn pdf(name: &str, data: &[u8]) -> Attachment {
        Attachment {
            data: data.to_vec(),
            content_type: "application/pdf".to_string(),
            filename: name.to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = setup_service().await;

        let created = service
            .create(create_form("Study X", "Read docs", "2024-08-19"))
            .await
            .unwrap();

        assert_eq!(created.status, TaskStatus::Todo);
        assert!(!created.has_file);

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.title, "Study X");
        assert_eq!(fetched.description, "Read docs");
        assert_eq!(fetched.deadline, created.deadline);
        assert_eq!(fetched.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_status() {
        let service = setup_service().await;
        let mut form = create_form("t", "d", "2030-01-01");
        form.status = Some("DONE".to_string());

        let created = service.create(form).await.unwrap();
        assert_eq!(created.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn create_without_required_fields_fails() {
        let service = setup_service().await;
        let mut form = create_form("t", "d", "2030-01-01");
        form.deadline = None;

        let err = service.create(form).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFields));

        let tasks = service.list().await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn create_aggregates_validation_violations() {
        let service = setup_service().await;
        let form = create_form(&"x".repeat(101), &"y".repeat(501), "garbage");

        let err = service.create(form).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Title cannot exceed 100 characters, Description cannot exceed 500 characters, Deadline must be a valid date"
        );
    }

    #[tokio::test]
    async fn create_with_whitespace_title_is_a_validation_error() {
        // Whitespace passes the presence check but fails the trimmed
        // required rule, so this is Validation rather than MissingFields.
        let service = setup_service().await;
        let form = create_form("   ", "d", "2030-01-01");

        let err = service.create(form).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Title is required");
    }

    #[tokio::test]
    async fn update_with_only_status_leaves_everything_else() {
        let service = setup_service().await;
        let created = service
            .create(create_form("keep me", "and me", "2030-01-01"))
            .await
            .unwrap();

        let form = TaskForm {
            status: Some("DONE".to_string()),
            ..TaskForm::default()
        };
        let updated = service.update(created.id, form).await.unwrap();

        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.title, "keep me");
        assert_eq!(updated.description, "and me");
        assert_eq!(updated.deadline, created.deadline);
        assert!(!updated.has_file);
    }

    #[tokio::test]
    async fn update_ignores_unknown_status_values() {
        let service = setup_service().await;
        let created = service
            .create(create_form("t", "d", "2030-01-01"))
            .await
            .unwrap();

        let form = TaskForm {
            status: Some("ARCHIVED".to_string()),
            ..TaskForm::default()
        };
        let updated = service.update(created.id, form).await.unwrap();
        assert_eq!(updated.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn update_treats_empty_fields_as_unchanged() {
        let service = setup_service().await;
        let created = service
            .create(create_form("original", "d", "2030-01-01"))
            .await
            .unwrap();

        let form = TaskForm {
            title: Some(String::new()),
            description: Some("new description".to_string()),
            ..TaskForm::default()
        };
        let updated = service.update(created.id, form).await.unwrap();
        assert_eq!(updated.title, "original");
        assert_eq!(updated.description, "new description");
    }

    #[tokio::test]
    async fn update_replaces_attachment_entirely() {
        let service = setup_service().await;
        let mut form = create_form("t", "d", "2030-01-01");
        form.file = Some(pdf("first.pdf", b"%PDF first"));
        let created = service.create(form).await.unwrap();

        let form = TaskForm {
            file: Some(pdf("second.pdf", b"%PDF second")),
            ..TaskForm::default()
        };
        service.update(created.id, form).await.unwrap();

        let file = service.get_file(created.id).await.unwrap();
        assert_eq!(file.data, b"%PDF second");
        assert_eq!(file.filename, "second.pdf");
        assert_eq!(file.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn update_validation_failure_persists_nothing() {
        let service = setup_service().await;
        let created = service
            .create(create_form("original", "d", "2030-01-01"))
            .await
            .unwrap();

        let form = TaskForm {
            title: Some("new title".to_string()),
            deadline: Some("garbage".to_string()),
            ..TaskForm::default()
        };
        let err = service.update(created.id, form).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched.title, "original");
    }

    #[tokio::test]
    async fn update_missing_task_is_not_found() {
        let service = setup_service().await;
        let err = service.update(42, TaskForm::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn mark_done_overrides_any_status() {
        let service = setup_service().await;
        let created = service
            .create(create_form("t", "d", "2030-01-01"))
            .await
            .unwrap();

        let marked = service.mark_done(created.id).await.unwrap();
        assert_eq!(marked.status, TaskStatus::Done);

        // Idempotent from the caller's point of view.
        let marked = service.mark_done(created.id).await.unwrap();
        assert_eq!(marked.status, TaskStatus::Done);
        assert_eq!(marked.title, "t");
    }

    #[tokio::test]
    async fn get_file_without_attachment_is_not_found() {
        let service = setup_service().await;
        let created = service
            .create(create_form("t", "d", "2030-01-01"))
            .await
            .unwrap();

        let err = service.get_file(created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "No file attached to this task");

        let err = service.get_file(9999).await.unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = setup_service().await;
        let created = service
            .create(create_form("t", "d", "2030-01-01"))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();

        let err = service.get(created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = service.delete(created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_sorted_most_recent_first() {
        let service = setup_service().await;
        let first = service
            .create(create_form("first", "d", "2030-01-01"))
            .await
            .unwrap();
        let second = service
            .create(create_form("second", "d", "2030-01-01"))
            .await
            .unwrap();

        let tasks = service.list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, second.id);
        assert_eq!(tasks[1].id, first.id);
    }
}
