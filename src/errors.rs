use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use tracing::error;

/// Every failure a handler can surface, mapped onto the HTTP contract.
///
/// Validation problems and attendance-rule violations are 400s; unknown ids
/// are 404s; storage failures are 500s with the detail kept out of the body.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "Missing field: {}", _0)]
    MissingField(&'static str),
    #[display(fmt = "Invalid date format: {}", _0)]
    InvalidDateFormat(&'static str),
    #[display(fmt = "Invalid salary")]
    InvalidSalary,
    #[display(fmt = "Employee code already exists")]
    DuplicateEmployeeCode,
    #[display(fmt = "Already clocked in today")]
    AlreadyClockedIn,
    #[display(fmt = "Not clocked in today")]
    NotClockedIn,
    #[display(fmt = "Already clocked out today")]
    AlreadyClockedOut,
    #[display(fmt = "Invalid login")]
    InvalidCredentials,
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "Internal server error")]
    Database(sqlx::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_)
            | ApiError::InvalidDateFormat(_)
            | ApiError::InvalidSalary
            | ApiError::DuplicateEmployeeCode
            | ApiError::AlreadyClockedIn
            | ApiError::NotClockedIn
            | ApiError::AlreadyClockedOut => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            message: self.to_string(),
        })
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "Database error");
        ApiError::Database(e)
    }
}
