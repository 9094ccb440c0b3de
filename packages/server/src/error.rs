use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `PERMISSION_DENIED`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Assignment not found")]
    pub message: String,
    /// Field-level validation messages, keyed by field name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// The request was understood but a field failed validation (422).
    Validation {
        message: String,
        errors: Option<BTreeMap<String, Vec<String>>>,
    },
    TokenMissing,
    TokenInvalid,
    PermissionDenied,
    NotFound(String),
    Internal(String),
}

impl AppError {
    /// Validation failure without per-field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            errors: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TokenMissing | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        let (code, message, errors) = match self {
            AppError::Validation { message, errors } => ("VALIDATION_ERROR", message, errors),
            AppError::TokenMissing => ("TOKEN_MISSING", "Authentication required".into(), None),
            AppError::TokenInvalid => ("TOKEN_INVALID", "Invalid or expired token".into(), None),
            AppError::PermissionDenied => {
                ("PERMISSION_DENIED", "Insufficient permissions".into(), None)
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg, None),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ("INTERNAL_ERROR", "An unexpected error occurred".into(), None)
            }
        };
        ErrorBody {
            code,
            message,
            errors,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::warn!("Foreign key violation: {detail}");
                AppError::validation("Record is still referenced by other records")
            }
            _ => AppError::Internal(err.to_string()),
        }
    }
}
