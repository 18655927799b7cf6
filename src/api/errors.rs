use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::time::{format_primitive, primitive_now_utc, seconds_until};
use crate::services::errors::ServiceError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug, Serialize)]
struct RateLimitResponse {
    status: u16,
    detail: String,
    blocked_until: String,
    retry_after_seconds: i64,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    UnprocessableEntity(String),
    TooManyRequests { detail: String, blocked_until: String, retry_after_seconds: i64 },
    Gone(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => Self::NotFound(err.to_string()),
            ServiceError::Validation(message) => Self::UnprocessableEntity(message),
            ServiceError::AuthenticationFailure(message) => Self::Unauthorized(message),
            ServiceError::RateLimited { blocked_until } => Self::TooManyRequests {
                detail: err.to_string(),
                blocked_until: format_primitive(blocked_until),
                retry_after_seconds: seconds_until(primitive_now_utc(), blocked_until),
            },
            ServiceError::Expired(message) => Self::Gone(message),
            ServiceError::Database(source) => Self::internal(source, "Database operation failed"),
        }
    }
}

fn error_body(status: StatusCode, detail: String) -> Response {
    (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let mut response = error_body(StatusCode::UNAUTHORIZED, message);
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::BadRequest(message) => error_body(StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => error_body(StatusCode::NOT_FOUND, message),
            ApiError::UnprocessableEntity(message) => {
                error_body(StatusCode::UNPROCESSABLE_ENTITY, message)
            }
            ApiError::TooManyRequests { detail, blocked_until, retry_after_seconds } => {
                let status = StatusCode::TOO_MANY_REQUESTS;
                let mut response = (
                    status,
                    Json(RateLimitResponse {
                        status: status.as_u16(),
                        detail,
                        blocked_until,
                        retry_after_seconds,
                    }),
                )
                    .into_response();
                response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(retry_after_seconds));
                response
            }
            ApiError::Gone(message) => error_body(StatusCode::GONE, message),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}
