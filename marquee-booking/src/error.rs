use marquee_core::{CacheError, StoreError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// Another reservation attempt holds the seat lock.
    LockHeld,
    /// The seat is already reserved. Retrying will not help.
    AlreadyReserved,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::LockHeld => f.write_str("Seat is currently being reserved by another user"),
            ConflictReason::AlreadyReserved => f.write_str("Seat already reserved"),
        }
    }
}

/// Every way a seat read or reservation can be turned down.
///
/// The variants are the tags the HTTP layer maps to status codes; `reason()`
/// is the machine-readable form sent to clients.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(ConflictReason),
    #[error("Transient infrastructure failure: {0}")]
    Transient(String),
}

impl BookingError {
    pub fn reason(&self) -> &'static str {
        match self {
            BookingError::Validation(_) => "validation_error",
            BookingError::NotFound(_) => "not_found",
            BookingError::Conflict(ConflictReason::LockHeld) => "seat_locked",
            BookingError::Conflict(ConflictReason::AlreadyReserved) => "already_reserved",
            BookingError::Transient(_) => "transient",
        }
    }

    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::Conflict(ConflictReason::LockHeld) | BookingError::Transient(_)
        )
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Transient(err.to_string())
    }
}

impl From<CacheError> for BookingError {
    fn from(err: CacheError) -> Self {
        BookingError::Transient(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Rejects a blank identifier; `field` names it in the message.
pub(crate) fn require<'a>(field: &str, value: &'a str) -> BookingResult<&'a str> {
    if value.trim().is_empty() {
        return Err(BookingError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons_separate_retryable_from_final() {
        let locked = BookingError::Conflict(ConflictReason::LockHeld);
        let taken = BookingError::Conflict(ConflictReason::AlreadyReserved);

        assert_eq!(locked.reason(), "seat_locked");
        assert!(locked.is_retryable());
        assert_eq!(taken.reason(), "already_reserved");
        assert!(!taken.is_retryable());
        assert!(!BookingError::NotFound("Seat not found".into()).is_retryable());

        let transient: BookingError = StoreError::Unavailable("pool timed out".into()).into();
        assert_eq!(transient.reason(), "transient");
        assert!(transient.is_retryable());
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("seatId", "A1").is_ok());
        assert!(matches!(require("seatId", "  "), Err(BookingError::Validation(_))));
    }
}
