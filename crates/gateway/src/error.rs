//! Error types for the gateway layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use libris_auth::AuthError;
use libris_library::LibraryError;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or invalid session, or a role that may not use the endpoint.
    #[error("{0}")]
    AuthenticationFailed(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl GatewayError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_kind(&self) -> &'static str {
        match self {
            GatewayError::AuthenticationFailed(_) => "unauthorized",
            GatewayError::Forbidden(_) => "forbidden",
            GatewayError::InvalidRequest(_) => "bad_request",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: self.error_kind().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<LibraryError> for GatewayError {
    fn from(error: LibraryError) -> Self {
        match error {
            LibraryError::Validation { message } => GatewayError::InvalidRequest(message),
            error @ LibraryError::NotFound { .. } => GatewayError::NotFound(error.to_string()),
            LibraryError::Forbidden { reason } => GatewayError::Forbidden(reason),
            LibraryError::Database(error) => GatewayError::DatabaseError(error.to_string()),
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => GatewayError::unauthorized("invalid email or password"),
            AuthError::SessionNotFound | AuthError::InvalidSession | AuthError::UserNotFound => {
                GatewayError::unauthorized("invalid session")
            }
            AuthError::SessionExpired => GatewayError::unauthorized("session expired"),
            AuthError::UserExists => GatewayError::InvalidRequest("user already exists".into()),
            AuthError::InvalidInput(message) => GatewayError::InvalidRequest(message),
            AuthError::Database(error) => GatewayError::DatabaseError(error.to_string()),
            AuthError::PasswordHash(error) => GatewayError::InternalError(error.to_string()),
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}
