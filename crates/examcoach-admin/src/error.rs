//! Error types for the admin domain.

use examcoach_core::{CallableError, ErrorKind, UserId};
use thiserror::Error;

/// Errors raised by the admin services, jobs and stores.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No caller identity was supplied.
    #[error("The function must be called while authenticated")]
    Unauthenticated,

    /// Caller is authenticated but is not an admin.
    #[error("Admin role required")]
    PermissionDenied,

    /// A required field is missing or malformed.
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        /// Offending payload field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Target user record does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Extend was invoked on a user without an active tester expiry.
    #[error("User {0} is not currently a tester")]
    NotATester(UserId),

    /// The identity provider rejected the operation.
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// A batch exceeded the store's per-batch write limit.
    #[error("Batch of {size} writes exceeds the limit of {limit}")]
    BatchTooLarge {
        /// Writes in the rejected batch.
        size: usize,
        /// Store limit.
        limit: usize,
    },

    /// Underlying document store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl AdminError {
    /// Shorthand for an invalid-argument error.
    pub fn invalid_argument(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            message: message.into(),
        }
    }

    /// The callable error kind this error surfaces as.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::NotATester(_) => ErrorKind::FailedPrecondition,
            Self::Identity(IdentityError::UserNotFound(_)) => ErrorKind::NotFound,
            Self::Identity(IdentityError::EmailAlreadyExists(_)) => ErrorKind::AlreadyExists,
            Self::Identity(IdentityError::InvalidToken) => ErrorKind::Unauthenticated,
            Self::Identity(IdentityError::Unavailable(_))
            | Self::BatchTooLarge { .. }
            | Self::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<AdminError> for CallableError {
    fn from(err: AdminError) -> Self {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Internal => "An internal error occurred".to_string(),
            _ => err.to_string(),
        };
        CallableError::new(kind, message)
    }
}

/// Errors raised by the identity provider port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// No account exists for the uid.
    #[error("no identity account for user {0}")]
    UserNotFound(UserId),

    /// The provider refused the new email.
    #[error("email already in use: {0}")]
    EmailAlreadyExists(String),

    /// The id token did not verify.
    #[error("invalid id token")]
    InvalidToken,

    /// Transport or provider-side failure.
    #[error("{0}")]
    Unavailable(String),
}

/// Result alias for the admin domain.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(AdminError::Unauthenticated.kind(), ErrorKind::Unauthenticated);
        assert_eq!(AdminError::PermissionDenied.kind(), ErrorKind::PermissionDenied);
        assert_eq!(
            AdminError::invalid_argument("targetUid", "required").kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            AdminError::UserNotFound(UserId::new("u1")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AdminError::NotATester(UserId::new("u1")).kind(),
            ErrorKind::FailedPrecondition
        );
        assert_eq!(
            AdminError::Store("down".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_identity_not_found_surfaces_as_not_found() {
        let err = AdminError::from(IdentityError::UserNotFound(UserId::new("ghost")));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = AdminError::from(IdentityError::Unavailable("timeout".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_duplicate_email_keeps_its_message() {
        let err = AdminError::from(IdentityError::EmailAlreadyExists("a@b.co".to_string()));
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let callable = CallableError::from(err);
        assert_eq!(callable.kind, ErrorKind::AlreadyExists);
        assert!(callable.message.contains("a@b.co"));

        let callable =
            CallableError::from(AdminError::from(IdentityError::Unavailable("dns".to_string())));
        assert_eq!(callable.message, "An internal error occurred");
    }

    #[test]
    fn test_callable_conversion_masks_internal_details() {
        let callable = CallableError::from(AdminError::Store("connection reset".to_string()));
        assert_eq!(callable.kind, ErrorKind::Internal);
        assert!(!callable.message.contains("connection reset"));

        let callable = CallableError::from(AdminError::NotATester(UserId::new("u9")));
        assert_eq!(callable.message, "User u9 is not currently a tester");
    }
}
