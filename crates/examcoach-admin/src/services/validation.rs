//! Payload validation shared by the admin commands.

use std::sync::LazyLock;

use examcoach_core::UserId;

use crate::error::{AdminError, Result};

/// `local@domain.tld` with no whitespace and exactly one `@`.
static EMAIL_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_REGEX is a valid regex pattern")
});

/// Validate the `targetUid` field of a command payload.
pub fn validate_target_uid(target_uid: &str) -> Result<UserId> {
    let trimmed = target_uid.trim();
    if trimmed.is_empty() {
        return Err(AdminError::invalid_argument(
            "targetUid",
            "targetUid is required",
        ));
    }
    Ok(UserId::new(trimmed))
}

/// Validate an email address for an admin email change.
///
/// Returns the trimmed address.
///
/// ```
/// use examcoach_admin::services::validation::validate_email;
///
/// assert!(validate_email("student@school.edu").is_ok());
/// assert!(validate_email("student@localhost").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AdminError::invalid_argument("newEmail", "newEmail is required"));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(AdminError::invalid_argument(
            "newEmail",
            "Invalid email format",
        ));
    }
    Ok(email.to_string())
}
