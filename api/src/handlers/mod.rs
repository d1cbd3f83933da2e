pub mod admin;
pub mod health;
pub mod judges;
pub mod metrics;
pub mod options;
pub mod projects;

// Common response types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::errors::{DatabaseError, NumberingError};
use serde::Serialize;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub trace_id: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Wrap a data layer failure with the step that failed
    pub fn database(context: &str, err: DatabaseError) -> Self {
        tracing::error!(error = %err, context = context, "Database operation failed");
        Self::new("database_error", format!("{}: {}", context, err))
    }
}

impl From<NumberingError> for ErrorResponse {
    fn from(err: NumberingError) -> Self {
        if err.is_validation() {
            tracing::warn!(error = %err, "Rejected numbering request");
            Self::new("validation_error", err.to_string())
        } else {
            tracing::error!(error = %err, "Numbering operation failed");
            Self::new("database_error", err.to_string())
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "validation_error" => StatusCode::BAD_REQUEST,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
