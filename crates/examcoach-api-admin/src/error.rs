//! Error types for the admin callable API.
//!
//! Every failure is rendered as a callable error body:
//!
//! ```json
//! { "error": { "status": "PERMISSION_DENIED", "message": "Admin role required" } }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use examcoach_admin::AdminError;
use examcoach_core::{CallableError, ErrorKind};
use serde::Serialize;

/// Error type for the admin callable API.
#[derive(Debug, thiserror::Error)]
pub enum ApiAdminError {
    /// Domain failure from a service.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Bearer token present but not accepted.
    #[error("Invalid or expired ID token")]
    InvalidToken,

    /// Request body could not be decoded.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Request field failed API-level validation.
    #[error("{0}")]
    Validation(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiAdminError {
    /// Convert into the callable error this renders as.
    ///
    /// Internal details are masked.
    #[must_use]
    pub fn into_callable(self) -> CallableError {
        let message = self.to_string();
        match self {
            Self::Admin(e) => e.into(),
            Self::InvalidToken => CallableError::new(ErrorKind::Unauthenticated, message),
            Self::InvalidBody(_) | Self::Validation(_) => {
                CallableError::new(ErrorKind::InvalidArgument, message)
            }
            Self::Internal(_) => {
                CallableError::new(ErrorKind::Internal, "An internal error occurred")
            }
        }
    }
}

/// Wire body of a failed callable.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Error details.
    pub error: ErrorBody,
}

/// Status string and message of a failed callable.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Upper-snake status, e.g. `NOT_FOUND`.
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl IntoResponse for ApiAdminError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        let callable = self.into_callable();

        if callable.kind == ErrorKind::Internal {
            tracing::error!(error = %detail, "Callable failed with internal error");
        } else {
            tracing::debug!(kind = %callable.kind, error = %detail, "Callable rejected");
        }

        let status = StatusCode::from_u16(callable.kind.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorEnvelope {
            error: ErrorBody {
                status: callable.kind.as_status(),
                message: callable.message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for admin API handlers.
pub type ApiResult<T> = Result<T, ApiAdminError>;

#[cfg(test)]
mod tests {
    use super::*;
    use examcoach_admin::IdentityError;
    use examcoach_core::UserId;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiAdminError::from(AdminError::Unauthenticated), StatusCode::UNAUTHORIZED),
            (ApiAdminError::from(AdminError::PermissionDenied), StatusCode::FORBIDDEN),
            (
                ApiAdminError::from(AdminError::UserNotFound(UserId::new("u1"))),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiAdminError::from(AdminError::NotATester(UserId::new("u1"))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiAdminError::from(AdminError::Identity(IdentityError::EmailAlreadyExists(
                    "a@b.c".to_string(),
                ))),
                StatusCode::CONFLICT,
            ),
            (ApiAdminError::InvalidToken, StatusCode::UNAUTHORIZED),
            (ApiAdminError::InvalidBody("eof".to_string()), StatusCode::BAD_REQUEST),
            (
                ApiAdminError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_message_is_masked() {
        let err = ApiAdminError::from(AdminError::Store("socket closed".to_string()));
        let callable = err.into_callable();
        assert_eq!(callable.kind, ErrorKind::Internal);
        assert_eq!(callable.message, "An internal error occurred");
    }
}
