//! Result payloads (the `result` member of each callable body).

use chrono::{DateTime, Utc};
use examcoach_admin::AdminAuditEvent;
use serde::Serialize;

/// `{"success": true}`.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    /// Always true; failures use the error body.
    pub success: bool,
}

impl SuccessResponse {
    /// A successful result.
    #[must_use]
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Result of `extendTester`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendTesterResponse {
    /// Always true.
    pub success: bool,
    /// The new tester expiry.
    pub new_expire: DateTime<Utc>,
}

/// Result of `listAuditLog`.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    /// Records, most recent first.
    pub events: Vec<AdminAuditEvent>,
}

/// Result of `submitIssue`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIssueResponse {
    /// Document id of the new issue.
    pub id: String,
    /// Display id supplied by the client, if any.
    pub display_id: Option<String>,
}
