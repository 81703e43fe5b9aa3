// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::handlers;
use crate::service::TaskService;
use crate::upload::MAX_FILE_SIZE;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
};

/// Creates and configures the application router.
pub fn create_router(service: TaskService) -> Router {
    Router::new()
        // Associates the `GET /tasks` route with the `list_tasks` handler
        .route("/tasks", get(handlers::list_tasks))
        // Associates the `POST /tasks` route with the `create_task` handler
        .route("/tasks", post(handlers::create_task))
        // Associates the `GET /tasks/{id}` route with the `get_task` handler
        .route("/tasks/{id}", get(handlers::get_task))
        // Associates the `PUT /tasks/{id}` route with the `update_task` handler
        .route("/tasks/{id}", put(handlers::update_task))
        // Associates the `DELETE /tasks/{id}` route with the `delete_task` handler
        .route("/tasks/{id}", delete(handlers::delete_task))
        // Associates the `GET /tasks/{id}/file` route with the `download_file` handler
        .route("/tasks/{id}/file", get(handlers::download_file))
        // Associates the `PATCH /tasks/{id}/status` route with the `mark_as_done` handler
        .route("/tasks/{id}/status", patch(handlers::mark_as_done))
        // Health check for deployment probes
        .route("/health", get(handlers::health))
        // The upload layer enforces the 10 MiB file ceiling itself; the
        // transport limit only needs headroom for the other form fields.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
        // Adds the task service to the application state
        .with_state(service)
}
