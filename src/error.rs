use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::schedule::BookingError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    Forbidden(String),
    PaymentRequired(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            ApiError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(value: BookingError) -> Self {
        match value {
            BookingError::LoginRequired | BookingError::RegistrationRequired => {
                ApiError::Forbidden(value.to_string())
            }
            BookingError::MembershipRequired => ApiError::PaymentRequired(value.to_string()),
            BookingError::UnbookRejected => ApiError::Conflict(value.to_string()),
            BookingError::Backend(err) => {
                error!("Backend error: {err}");
                ApiError::BadGateway("Booking backend unavailable".into())
            }
        }
    }
}
