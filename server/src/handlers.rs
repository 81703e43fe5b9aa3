// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::ApiError;
use crate::service::TaskService;
use crate::upload;

use axum::{
    extract::{Json, Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Handler for listing all tasks (sanitized, most recent first).
pub async fn list_tasks(State(service): State<TaskService>) -> Result<Json<Value>, ApiError> {
    let tasks = service.list().await?;
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(json!({ "success": true, "data": tasks })))
}

/// Handler for fetching a single task by ID.
pub async fn get_task(
    State(service): State<TaskService>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let task = service.get(task_id).await?;
    Ok(Json(json!({ "success": true, "data": task })))
}

/// Handler for downloading the PDF attached to a task. This is the only
/// endpoint that returns raw attachment bytes.
pub async fn download_file(
    State(service): State<TaskService>,
    Path(task_id): Path<i64>,
) -> Result<Response, ApiError> {
    let file = service.get_file(task_id).await?;
    debug!(
        "Streaming file {} ({} bytes) for task ID: {}",
        file.filename,
        file.data.len(),
        task_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.data,
    )
        .into_response())
}

/// Handler for creating a new task from a multipart form, with an optional
/// PDF attachment under the `linkedFile` field.
pub async fn create_task(
    State(service): State<TaskService>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let form = upload::read_task_form(multipart).await?;
    debug!("Received request to create task: {:?}", form.title);

    let task = service.create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": task,
            "message": "Task created successfully"
        })),
    ))
}

/// Handler for partially updating a task. Fields left out of the form are
/// unchanged; a supplied file replaces the previous attachment.
pub async fn update_task(
    State(service): State<TaskService>,
    Path(task_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = upload::read_task_form(multipart).await?;
    debug!("Received request to update task with ID: {}", task_id);

    let task = service.update(task_id, form).await?;

    Ok(Json(json!({
        "success": true,
        "data": task,
        "message": "Task updated successfully"
    })))
}

/// Handler for marking a task as DONE regardless of its current status.
pub async fn mark_as_done(
    State(service): State<TaskService>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let task = service.mark_done(task_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": task,
        "message": "Task marked as done"
    })))
}

/// Handler for permanently deleting a task by ID.
pub async fn delete_task(
    State(service): State<TaskService>,
    Path(task_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    service.delete(task_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Task deleted successfully"
    })))
}

/// Health check.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Task Manager API is running" }))
}
