//! Error Types
//!
//! The error taxonomy shared by every callable operation. Each kind maps to a
//! wire status string and an HTTP status code.
//!
//! # Example
//!
//! ```
//! use examcoach_core::{CallableError, ErrorKind};
//!
//! let error = CallableError::new(ErrorKind::PermissionDenied, "Admin role required");
//! assert_eq!(error.kind.http_status_code(), 403);
//! assert_eq!(error.to_string(), "permission-denied: Admin role required");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure kind of a callable operation.
///
/// # Variants
///
/// - `Unauthenticated` - No caller identity (HTTP 401)
/// - `PermissionDenied` - Caller is authenticated but lacks the admin role (HTTP 403)
/// - `InvalidArgument` - Missing or malformed required field (HTTP 400)
/// - `NotFound` - Target record absent (HTTP 404)
/// - `FailedPrecondition` - Operation invoked in a state that does not support it (HTTP 400)
/// - `AlreadyExists` - The identity provider refused a value already in use (HTTP 409)
/// - `Internal` - Anything else (HTTP 500)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// No caller identity.
    Unauthenticated,
    /// Authenticated but not allowed.
    PermissionDenied,
    /// Missing or malformed argument.
    InvalidArgument,
    /// Target record absent.
    NotFound,
    /// Operation not supported in the current state.
    FailedPrecondition,
    /// A unique value is already taken.
    AlreadyExists,
    /// Unexpected failure of a downstream dependency.
    Internal,
}

impl ErrorKind {
    /// Wire status string used in callable error bodies.
    #[must_use]
    pub const fn as_status(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Internal => "INTERNAL",
        }
    }

    /// HTTP status code for this kind.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::InvalidArgument | Self::FailedPrecondition => 400,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::PermissionDenied => write!(f, "permission-denied"),
            Self::InvalidArgument => write!(f, "invalid-argument"),
            Self::NotFound => write!(f, "not-found"),
            Self::FailedPrecondition => write!(f, "failed-precondition"),
            Self::AlreadyExists => write!(f, "already-exists"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// A structured callable failure: kind plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct CallableError {
    /// Failure kind.
    pub kind: ErrorKind,
    /// Message shown to the invoking UI.
    pub message: String,
}

impl CallableError {
    /// Create a new callable error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
