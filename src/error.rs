use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::ApiResponse;

/// Errors raised by the booking, inventory and catalog services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Not enough available seats: requested {requested}, available {available}")]
    CapacityExceeded { requested: usize, available: i32 },

    #[error("You have already confirmed a booking for seat {seat_id} in this showtime")]
    DuplicateConfirmedBooking { seat_id: i64 },

    #[error("Seat {seat_id} is not available")]
    SeatUnavailable { seat_id: i64 },

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ServiceError::NotFound { entity, id }
    }

    /// True for the errors that describe a lost race for a seat.
    pub fn is_seat_conflict(&self) -> bool {
        matches!(
            self,
            ServiceError::SeatUnavailable { .. }
                | ServiceError::DuplicateConfirmedBooking { .. }
                | ServiceError::CapacityExceeded { .. }
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(errors.to_string())
    }
}

/// HTTP-facing error. Service errors pass through; auth failures are added here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Service(ServiceError::Store(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Service(errors.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Service(err) => match err {
                ServiceError::Validation(_)
                | ServiceError::InvalidState(_)
                | ServiceError::CapacityExceeded { .. } => StatusCode::BAD_REQUEST,
                ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
                ServiceError::DuplicateConfirmedBooking { .. }
                | ServiceError::SeatUnavailable { .. }
                | ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Store(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
                ServiceError::Store(_) | ServiceError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Service(ServiceError::Store(sqlx::Error::RowNotFound)) => {
                "Resource not found".to_string()
            }
            AppError::Service(ServiceError::Store(err)) => {
                tracing::error!(error = %err, "Database error");
                "An internal error occurred".to_string()
            }
            AppError::Service(ServiceError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}
