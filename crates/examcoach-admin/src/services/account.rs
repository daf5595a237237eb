//! Account-level admin commands: disable/enable and email changes.
//!
//! Both commands write to the identity provider first and the user record
//! second. There is no compensation if a later write fails; the record may
//! then lag the provider until the command is retried.

use std::sync::Arc;

use serde_json::json;

use crate::audit::{AdminAuditAction, AdminAuditEventInput, AuditStore};
use crate::clock::Clock;
use crate::error::{AdminError, Result};
use crate::identity::IdentityProvider;
use crate::services::authorization::require_admin;
use crate::services::validation::{validate_email, validate_target_uid};
use crate::stats::{StatCounter, StatsRecorder};
use crate::store::UserStore;
use crate::types::{CallerIdentity, UserPatch, UserRecord};

/// Service for account lockout and email administration.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    audit_store: Arc<dyn AuditStore>,
    identity: Arc<dyn IdentityProvider>,
    stats: StatsRecorder,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(
        users: Arc<dyn UserStore>,
        audit_store: Arc<dyn AuditStore>,
        identity: Arc<dyn IdentityProvider>,
        stats: StatsRecorder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            audit_store,
            identity,
            stats,
            clock,
        }
    }

    /// Disable or re-enable an account.
    ///
    /// The identity provider is updated first; if it fails nothing else is
    /// written. The user record is merged, so a missing record is created.
    pub async fn set_disabled(
        &self,
        caller: Option<&CallerIdentity>,
        target_uid: &str,
        disabled: Option<bool>,
    ) -> Result<UserRecord> {
        let admin = require_admin(self.users.as_ref(), caller).await?;
        let uid = validate_target_uid(target_uid)?;
        let disabled = disabled
            .ok_or_else(|| AdminError::invalid_argument("disabled", "disabled is required"))?;

        let before = self.users.get(&uid).await?;

        if let Err(e) = self.identity.set_disabled(&uid, disabled).await {
            tracing::warn!(target_uid = %uid, error = %e, "Identity provider rejected disable");
            return Err(e.into());
        }

        let now = self.clock.now();
        let patch = UserPatch {
            disabled: Some(disabled),
            updated_at: Some(now),
            ..Default::default()
        };
        let updated = self.users.merge(&uid, &patch, now).await?;

        let action = if disabled {
            AdminAuditAction::DisableUser
        } else {
            AdminAuditAction::EnableUser
        };
        self.audit_store
            .log_event(AdminAuditEventInput {
                action,
                admin_uid: (&admin.uid).into(),
                target_user_id: uid.clone(),
                target_email: updated.email.clone(),
                prev_state: Some(json!({
                    "disabled": before.as_ref().is_some_and(|u| u.disabled),
                })),
                new_state: Some(json!({ "disabled": disabled })),
                metadata: None,
            })
            .await?;

        if disabled {
            self.stats.record(StatCounter::UsersDisabled);
        }

        tracing::info!(
            admin_uid = %admin.uid,
            target_uid = %uid,
            action = %action,
            "Account disabled flag updated"
        );

        Ok(updated)
    }

    /// Change an account's sign-in email.
    pub async fn update_email(
        &self,
        caller: Option<&CallerIdentity>,
        target_uid: &str,
        new_email: &str,
    ) -> Result<UserRecord> {
        let admin = require_admin(self.users.as_ref(), caller).await?;
        let uid = validate_target_uid(target_uid)?;
        let new_email = validate_email(new_email)?;

        let before = self
            .users
            .get(&uid)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        self.identity.update_email(&uid, &new_email).await?;

        let patch = UserPatch {
            email: Some(new_email.clone()),
            updated_at: Some(self.clock.now()),
            ..Default::default()
        };
        let updated = self
            .users
            .update(&uid, &patch)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        self.audit_store
            .log_event(AdminAuditEventInput {
                action: AdminAuditAction::UpdateEmail,
                admin_uid: (&admin.uid).into(),
                target_user_id: uid.clone(),
                target_email: Some(new_email.clone()),
                prev_state: Some(json!({ "email": before.email })),
                new_state: Some(json!({ "email": new_email })),
                metadata: None,
            })
            .await?;

        tracing::info!(admin_uid = %admin.uid, target_uid = %uid, "Account email updated");

        Ok(updated)
    }
}
