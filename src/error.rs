use actix_web::{HttpResponse, ResponseError, error::InternalError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::document::StoreError;

/// Every way an attendance or roster action can be refused.
///
/// None of these are fatal: the action is not applied and the caller may retry.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[display(fmt = "Already clocked in today")]
    AlreadyClockedIn,

    #[display(fmt = "Already clocked out today")]
    AlreadyClockedOut,

    #[display(fmt = "Work log is required")]
    EmptyLog,

    #[display(fmt = "Work log must be at most {} characters", max)]
    LogTooLong { max: usize },

    #[display(fmt = "Attendance record not found")]
    NotFound,

    #[display(fmt = "No clock-out is waiting for this submission")]
    NoPendingClockOut,

    #[display(fmt = "Invalid time '{}', expected HH:MM or HH:MM:SS", _0)]
    InvalidTime(String),

    #[display(fmt = "Invalid date '{}', expected DD/MM/YYYY", _0)]
    InvalidDate(String),

    #[display(fmt = "No active employee with id '{}'", _0)]
    UnknownEmployee(String),

    #[display(fmt = "Employee '{}' already exists", _0)]
    EmployeeExists(String),

    #[display(fmt = "Invalid employee: {}", _0)]
    InvalidEmployee(String),

    #[display(fmt = "Could not save attendance data, please retry: {}", _0)]
    PersistenceFailure(String),
}

impl std::error::Error for AttendanceError {}

/// The one error body the API sends: `{"message": ...}`.
pub fn message_response(status: StatusCode, message: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "message": message.to_string()
    }))
}

/// Wraps a refusal outside `AttendanceError` (gates, extractors) in the same body.
pub fn message_error(status: StatusCode, message: impl std::fmt::Display) -> actix_web::Error {
    let message = message.to_string();
    InternalError::from_response(message.clone(), message_response(status, message)).into()
}

impl From<StoreError> for AttendanceError {
    fn from(err: StoreError) -> Self {
        AttendanceError::PersistenceFailure(err.to_string())
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::AlreadyClockedIn
            | AttendanceError::AlreadyClockedOut
            | AttendanceError::EmployeeExists(_)
            | AttendanceError::NoPendingClockOut => StatusCode::CONFLICT,
            AttendanceError::EmptyLog
            | AttendanceError::LogTooLong { .. }
            | AttendanceError::InvalidTime(_)
            | AttendanceError::InvalidDate(_)
            | AttendanceError::InvalidEmployee(_) => StatusCode::BAD_REQUEST,
            AttendanceError::NotFound | AttendanceError::UnknownEmployee(_) => {
                StatusCode::NOT_FOUND
            }
            AttendanceError::PersistenceFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        message_response(self.status_code(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(AttendanceError::EmptyLog.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AttendanceError::InvalidTime("25:00".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_errors_become_persistence_failures() {
        let err: AttendanceError = StoreError::Conflict {
            key: "attendance".into(),
            expected: 3,
        }
        .into();
        assert!(matches!(err, AttendanceError::PersistenceFailure(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn gate_errors_share_the_body_shape() {
        let resp = message_error(StatusCode::UNAUTHORIZED, "Incorrect PIN").error_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get("content-type").and_then(|h| h.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn log_limit_is_in_the_message() {
        assert_eq!(
            AttendanceError::LogTooLong { max: 150 }.to_string(),
            "Work log must be at most 150 characters"
        );
    }
}
