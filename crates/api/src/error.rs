use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use innkeep_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `innkeep_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request body failed its declarative field checks.
    #[error("Invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- HTTP-specific errors ---
            AppError::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
///
/// - Malformed input (`Validation`, `InvalidDateRange`) maps to 400.
/// - Missing records map to 404.
/// - Contention with existing state (`RoomUnavailable`, `Conflict`,
///   `AlreadyCancelled`) maps to 409.
/// - Well-formed requests the rules refuse (`CapacityExceeded`,
///   `InvalidTransition`) map to 422.
/// - `Storage` maps to 500 with a sanitized message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::InvalidDateRange(msg) => (
            StatusCode::BAD_REQUEST,
            "INVALID_DATE_RANGE",
            msg.clone(),
        ),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::NotFoundByKey { entity, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} not found"),
        ),
        CoreError::RoomUnavailable { .. } => {
            (StatusCode::CONFLICT, "ROOM_UNAVAILABLE", err.to_string())
        }
        CoreError::AlreadyCancelled(_) => {
            (StatusCode::CONFLICT, "ALREADY_CANCELLED", err.to_string())
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::CapacityExceeded { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "CAPACITY_EXCEEDED",
            err.to_string(),
        ),
        CoreError::InvalidTransition { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_TRANSITION",
            err.to_string(),
        ),
        CoreError::Storage(msg) => {
            tracing::error!(error = %msg, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}
