// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Closed set of failures the API can report. The service layer raises
/// these; this module holds the single mapping to HTTP status codes and
/// the `{success:false, message}` envelope. Nothing else in the server
/// builds error responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The referenced task (or its attachment) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// One or more field constraints were violated; the message is the
    /// comma-separated concatenation of the individual violations.
    #[error("{0}")]
    Validation(String),

    /// A required creation field was absent from the request.
    #[error("title, description and deadline are all required")]
    MissingFields,

    /// The uploaded file declared a content type other than PDF.
    #[error("Only PDF files are allowed")]
    InvalidFile,

    /// The uploaded file exceeded the 10 MiB ceiling.
    #[error("File too large – max 10 MB allowed.")]
    FileTooLarge,

    /// Anything unclassified. The cause is logged server-side only; the
    /// caller sees a generic message.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(message: &str) -> Self {
        ApiError::NotFound(message.to_string())
    }

    /// Aggregates field violations into a single validation error.
    pub fn validation(violations: Vec<String>) -> Self {
        ApiError::Validation(violations.join(", "))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_)
            | ApiError::MissingFields
            | ApiError::InvalidFile
            | ApiError::FileTooLarge => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

/// Allows Axum to convert an `ApiError` into an HTTP `Response`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            tracing::error!("Internal server error: {:?}", cause);
        }
        let code = self.status_code();
        tracing::error!(
            "Responding with error: status_code={}, message={}",
            code.as_u16(),
            self
        );
        (
            code,
            Json(serde_json::json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_the_taxonomy() {
        assert_eq!(
            ApiError::not_found("Task not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::MissingFields.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::FileTooLarge.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_joins_violations_with_commas() {
        let err = ApiError::validation(vec![
            "Title cannot exceed 100 characters".to_string(),
            "Description is required".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Title cannot exceed 100 characters, Description is required"
        );
    }

    #[test]
    fn internal_message_never_leaks_the_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
