//! Audit log callable.
//!
//! POST /listAuditLog

use std::sync::Arc;

use axum::Extension;
use examcoach_admin::services::require_admin;
use examcoach_admin::{AdminAuditAction, AuditEventFilter, AuditStore, CallerIdentity, UserStore};
use examcoach_core::UserId;

use crate::error::{ApiAdminError, ApiResult};
use crate::models::{AuditLogResponse, Callable, CallableResponse, ListAuditLogRequest};

/// Default page size.
pub const DEFAULT_AUDIT_LIMIT: usize = 50;

/// Maximum page size.
pub const MAX_AUDIT_LIMIT: usize = 200;

/// Lists audit records, most recent first.
pub async fn list_audit_log_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    Extension(audit_store): Extension<Arc<dyn AuditStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<AuditLogResponse>> {
    let caller = caller.map(|Extension(c)| c);
    require_admin(users.as_ref(), caller.as_ref()).await?;
    let request: ListAuditLogRequest = payload.decode()?;

    let action = request
        .action
        .as_deref()
        .map(parse_action)
        .transpose()?;
    let limit = request
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .clamp(1, MAX_AUDIT_LIMIT);

    let filter = AuditEventFilter {
        target_user_id: request
            .target_uid
            .filter(|uid| !uid.trim().is_empty())
            .map(UserId::new),
        action,
        limit: Some(limit),
        ..Default::default()
    };

    let events = audit_store.query_events(filter).await?;
    Ok(CallableResponse::new(AuditLogResponse { events }))
}

fn parse_action(action: &str) -> Result<AdminAuditAction, ApiAdminError> {
    serde_json::from_value(serde_json::Value::String(action.to_string()))
        .map_err(|_| ApiAdminError::Validation(format!("Unknown audit action '{action}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action() {
        assert_eq!(
            parse_action("auto-expire").unwrap(),
            AdminAuditAction::AutoExpire
        );
        assert!(parse_action("delete-everything").is_err());
    }
}
