use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failures returned to clients as `{error, message}` JSON.
#[derive(Debug)]
pub enum StubError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl StubError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            StubError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing or invalid token".to_string(),
            ),
            StubError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m.clone()),
            StubError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "not_found", format!("{} not found", what))
            }
            StubError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.clone()),
        }
    }
}

impl std::fmt::Display for StubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (_, _, message) = self.parts();
        write!(f, "{}", message)
    }
}

impl std::error::Error for StubError {}

impl IntoResponse for StubError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        (status, Json(ErrorBody { error, message })).into_response()
    }
}
