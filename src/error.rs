//! HTTP-facing error type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Errors that terminate a request.
///
/// Page fetch failures never reach this type; they are absorbed by the aggregator.
#[derive(Debug)]
pub enum AppError {
    /// The cache store failed while reading or populating the dataset.
    Cache { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn cache(message: impl Into<String>, details: Value) -> Self {
        Self::Cache {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Cache { message, .. } | AppError::Internal { message, .. } => {
                write!(f, "{}", message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Cache { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "cache_error",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}
