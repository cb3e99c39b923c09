use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_booking::{BookingError, ConflictReason};
use marquee_core::StoreError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    LockedError(String),
    ConflictError(String),
    UnavailableError(String),
}

impl AppError {
    fn reason(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFoundError(_) => "not_found",
            AppError::LockedError(_) => "seat_locked",
            AppError::ConflictError(_) => "already_reserved",
            AppError::UnavailableError(_) => "transient",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let reason = self.reason();
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::LockedError(msg) => (StatusCode::LOCKED, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnavailableError(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable, try again later".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "reason": reason,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let msg = err.to_string();
        match err {
            BookingError::Validation(_) => AppError::ValidationError(msg),
            BookingError::NotFound(_) => AppError::NotFoundError(msg),
            BookingError::Conflict(ConflictReason::LockHeld) => AppError::LockedError(msg),
            BookingError::Conflict(ConflictReason::AlreadyReserved) => AppError::ConflictError(msg),
            BookingError::Transient(_) => AppError::UnavailableError(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::UnavailableError(err.to_string())
    }
}
