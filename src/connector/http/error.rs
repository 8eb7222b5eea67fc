use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domain::DomainError;

/// Turns use case failures into HTTP responses. Field-level validation
/// errors keep their `{"field": [..]}` shape, everything else is wrapped
/// as `{"detail": [..]}`.
#[derive(Debug)]
pub struct ApiError(DomainError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(DomainError::invalid_input(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation(_) | DomainError::InvalidInput(_) | DomainError::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            DomainError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::StorageError(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            DomainError::Validation(fields) => json!(fields),
            DomainError::InvalidInput(msg)
            | DomainError::NotFound(msg)
            | DomainError::PermissionDenied(msg)
            | DomainError::Unauthenticated(msg)
            | DomainError::AlreadyExists(msg) => json!({ "detail": [msg] }),
            other => {
                error!("Request failed: {}", other);
                json!({ "detail": ["Internal server error."] })
            }
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(value) = "Token".parse() {
                response.headers_mut().insert(axum::http::header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
