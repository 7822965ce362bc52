//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Kiosk API                          │
//! │                                                                         │
//! │  Handler → Result<T, ApiError>                                         │
//! │                                                                         │
//! │  ValidationError ────────────────────► 400 VALIDATION_ERROR            │
//! │  CoreError::AddonMismatch / UnitNotInOrder ► 400 INVALID_REFERENCE     │
//! │  CoreError::MenuItemNotFound / AddonNotFound ► 400 NOT_FOUND           │
//! │  CoreError::OrderNotFound / OrderExpired / UnitNotFound ► 404 NOT_FOUND│
//! │  DbError::NotFound (menu id) ────────► 404 NOT_FOUND                   │
//! │  CoreError::OrderLocked ─────────────► 403 LOCKED                      │
//! │  Malformed JSON, store failure ──────► 500 INTERNAL (detail logged)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Response body:
//! ```json
//! { "error": "Order not found: 6f1c…", "code": "NOT_FOUND" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use kiosk_core::{CoreError, ValidationError};
use kiosk_db::DbError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error returned by every handler.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
}

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or missing required input
    ValidationError,

    /// Referenced entity absent
    NotFound,

    /// Mutation attempted on a time-locked order
    Locked,

    /// Entity exists but a relationship invariant is violated
    InvalidReference,

    /// Anything unexpected
    Internal,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: ErrorCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, ErrorCode::NotFound, message)
    }

    /// Logs `detail` and returns a generic 500.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "Internal error");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            INTERNAL_MESSAGE,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),

            // Bad references inside an order request are client input errors
            CoreError::MenuItemNotFound(_) | CoreError::AddonNotFound(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::NotFound,
                err.to_string(),
            ),

            CoreError::AddonMismatch { .. }
            | CoreError::UnitNotInOrder { .. }
            | CoreError::AddonSelectionRejected { .. } => ApiError::new(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidReference,
                err.to_string(),
            ),

            // An expired order no longer exists
            CoreError::OrderNotFound(id) | CoreError::OrderExpired(id) => {
                ApiError::not_found(format!("Order not found: {id}"))
            }

            CoreError::UnitNotFound(_) => ApiError::not_found(err.to_string()),

            CoreError::OrderLocked(_) => {
                ApiError::new(StatusCode::FORBIDDEN, ErrorCode::Locked, err.to_string())
            }

            CoreError::InvalidLifecyclePolicy { .. } => ApiError::internal(err),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => e.into(),
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            other => ApiError::internal(other),
        }
    }
}
