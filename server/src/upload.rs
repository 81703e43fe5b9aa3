// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::error::ApiError;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::Attachment;
use tracing::debug;

/// Per-file size ceiling. The router's body limit sits slightly above this
/// so the check here fires before the transport cuts the request off.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Raw form values captured from a create/update request. Text fields keep
/// their string form; the service decides what "absent" means per field.
#[derive(Debug, Default)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub status: Option<String>,
    pub file: Option<Attachment>,
}

/// Drains a multipart request into a [`TaskForm`]. The file part is
/// filtered as it is read: a non-PDF content type is rejected before its
/// body is consumed, and an oversized body is rejected as soon as the
/// ceiling is crossed. Unknown fields are ignored.
pub async fn read_task_form(mut multipart: Multipart) -> Result<TaskForm, ApiError> {
    let mut form = TaskForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "linkedFile" => form.file = Some(read_pdf_field(field).await?),
            "title" => form.title = Some(read_text(field).await?),
            "description" => form.description = Some(read_text(field).await?),
            "deadline" => form.deadline = Some(read_text(field).await?),
            "status" => form.status = Some(read_text(field).await?),
            other => debug!("Ignoring unknown multipart field: {}", other),
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Internal(e.into()))
}

async fn read_pdf_field(mut field: Field<'_>) -> Result<Attachment, ApiError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if content_type != "application/pdf" {
        return Err(ApiError::InvalidFile);
    }

    let filename = field.file_name().unwrap_or("file.pdf").to_string();

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
    {
        if data.len() + chunk.len() > MAX_FILE_SIZE {
            return Err(ApiError::FileTooLarge);
        }
        data.extend_from_slice(&chunk);
    }

    debug!("Captured upload: {} ({} bytes)", filename, data.len());

    Ok(Attachment {
        data,
        content_type,
        filename,
    })
}
