use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Externally visible error class. Each service error variant maps to exactly
/// one class; the class alone decides the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or missing input the caller can correct.
    Validation,
    /// Bad credentials, invalid OTP, invalid or expired session token.
    Unauthorized,
    /// Authenticated but not allowed (role or ownership).
    Forbidden,
    /// Referenced resource is absent.
    NotFound,
    /// State conflict (duplicate, already consumed, in use).
    Conflict,
    /// Caller exceeded a throttle.
    RateLimited,
    Internal,
}

impl ErrorClass {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Render the shared `{ "kind", "message" }` error body.
pub fn error_response(class: ErrorClass, kind: &str, message: String) -> Response {
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (class.status(), axum::Json(body)).into_response()
}
