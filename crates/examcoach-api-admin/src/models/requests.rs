//! Request payloads (the `data` member of each callable body).

use serde::Deserialize;

/// Payload of `grantTester`, `revokeTester` and `extendTester`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetUserRequest {
    /// User to act on.
    #[serde(default)]
    pub target_uid: String,
}

/// Payload of `disableUser`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableUserRequest {
    /// User to act on.
    #[serde(default)]
    pub target_uid: String,
    /// `true` to disable, `false` to re-enable.
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// Payload of `adminUpdateUserEmail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmailRequest {
    /// User to act on.
    #[serde(default)]
    pub target_uid: String,
    /// Replacement email.
    #[serde(default)]
    pub new_email: String,
}

/// Payload of `listAuditLog`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogRequest {
    /// Only records about this user.
    pub target_uid: Option<String>,
    /// Only records of this action, e.g. `grant-tester`.
    pub action: Option<String>,
    /// Page size (default 50, max 200).
    pub limit: Option<usize>,
}

/// Payload of `submitIssue`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIssueRequest {
    /// Short summary.
    #[serde(default)]
    pub title: String,
    /// Free-form details.
    pub description: Option<String>,
    /// Reporter-chosen category.
    pub category: Option<String>,
    /// Client app that filed the issue.
    pub source_app: Option<String>,
    /// Identifier assigned by the client, if any.
    pub display_id: Option<String>,
}
