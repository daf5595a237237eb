//! Tester entitlement commands.
//!
//! A tester grant is a time-boxed Pro entitlement set by an admin. It lives on
//! the user record next to any payment-processor billing state and never
//! overwrites Stripe-verified billing fields when it ends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::audit::{AdminAuditAction, AdminAuditEventInput, AuditStore};
use crate::clock::Clock;
use crate::error::{AdminError, Result};
use crate::services::authorization::require_admin;
use crate::services::validation::validate_target_uid;
use crate::stats::{StatCounter, StatsRecorder};
use crate::store::UserStore;
use crate::types::{
    tester_extension_duration, tester_grant_duration, BillingSource, BillingStatus,
    CallerIdentity, UserPatch, UserRecord, TESTER_EXTENSION_DAYS,
};

/// Service for granting, revoking and extending tester overrides.
pub struct TesterService {
    users: Arc<dyn UserStore>,
    audit_store: Arc<dyn AuditStore>,
    stats: StatsRecorder,
    clock: Arc<dyn Clock>,
}

impl TesterService {
    /// Create a new tester service.
    pub fn new(
        users: Arc<dyn UserStore>,
        audit_store: Arc<dyn AuditStore>,
        stats: StatsRecorder,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            audit_store,
            stats,
            clock,
        }
    }

    /// Grant a fresh 14-day tester override.
    ///
    /// Re-granting an active tester restarts the window from now.
    pub async fn grant(
        &self,
        caller: Option<&CallerIdentity>,
        target_uid: &str,
    ) -> Result<UserRecord> {
        let admin = require_admin(self.users.as_ref(), caller).await?;
        let uid = validate_target_uid(target_uid)?;

        let before = self
            .users
            .get(&uid)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        let now = self.clock.now();
        let expires_at = now + tester_grant_duration();
        let patch = UserPatch {
            tester_override: Some(true),
            tester_expires_at: Some(Some(expires_at)),
            is_pro: Some(true),
            tester_granted_by: Some(admin.uid.clone()),
            tester_granted_at: Some(now),
            billing_status: Some(BillingStatus::Tester),
            billing_source: Some(Some(BillingSource::Manual)),
            updated_at: Some(now),
            ..Default::default()
        };

        let updated = self
            .users
            .update(&uid, &patch)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        self.audit_store
            .log_event(AdminAuditEventInput {
                action: AdminAuditAction::GrantTester,
                admin_uid: (&admin.uid).into(),
                target_user_id: uid.clone(),
                target_email: before.email.clone(),
                prev_state: Some(json!({
                    "testerOverride": before.tester_override,
                    "isPro": before.is_pro,
                })),
                new_state: Some(json!({
                    "testerOverride": true,
                    "isPro": true,
                    "testerExpiresAt": expires_at,
                })),
                metadata: None,
            })
            .await?;

        self.stats.record(StatCounter::TestersGranted);

        tracing::info!(
            admin_uid = %admin.uid,
            target_uid = %uid,
            expires_at = %expires_at,
            "Tester override granted"
        );

        Ok(updated)
    }

    /// End a tester override immediately.
    ///
    /// Idempotent: revoking a user who is not a tester succeeds and leaves the
    /// same end state.
    pub async fn revoke(
        &self,
        caller: Option<&CallerIdentity>,
        target_uid: &str,
    ) -> Result<UserRecord> {
        let admin = require_admin(self.users.as_ref(), caller).await?;
        let uid = validate_target_uid(target_uid)?;

        let before = self
            .users
            .get(&uid)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        let now = self.clock.now();
        let patch = UserPatch::end_tester_override(&before, now);
        let updated = self
            .users
            .update(&uid, &patch)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        self.audit_store
            .log_event(AdminAuditEventInput {
                action: AdminAuditAction::RevokeTester,
                admin_uid: (&admin.uid).into(),
                target_user_id: uid.clone(),
                target_email: before.email.clone(),
                prev_state: Some(json!({
                    "testerOverride": before.tester_override,
                    "isPro": before.is_pro,
                })),
                new_state: Some(json!({
                    "testerOverride": updated.tester_override,
                    "isPro": updated.is_pro,
                })),
                metadata: None,
            })
            .await?;

        self.stats.record(StatCounter::TestersRevoked);

        tracing::info!(
            admin_uid = %admin.uid,
            target_uid = %uid,
            stripe_verified = before.is_stripe_verified(),
            "Tester override revoked"
        );

        Ok(updated)
    }

    /// Push the current expiry out by seven days.
    ///
    /// Extensions stack on the existing expiry, not on now. Returns the new
    /// expiry.
    pub async fn extend(
        &self,
        caller: Option<&CallerIdentity>,
        target_uid: &str,
    ) -> Result<DateTime<Utc>> {
        let admin = require_admin(self.users.as_ref(), caller).await?;
        let uid = validate_target_uid(target_uid)?;

        let before = self
            .users
            .get(&uid)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        let current = before
            .tester_expires_at
            .ok_or_else(|| AdminError::NotATester(uid.clone()))?;
        let new_expires_at = current + tester_extension_duration();

        let patch = UserPatch {
            tester_expires_at: Some(Some(new_expires_at)),
            updated_at: Some(self.clock.now()),
            ..Default::default()
        };
        self.users
            .update(&uid, &patch)
            .await?
            .ok_or_else(|| AdminError::UserNotFound(uid.clone()))?;

        self.audit_store
            .log_event(AdminAuditEventInput {
                action: AdminAuditAction::ExtendTester,
                admin_uid: (&admin.uid).into(),
                target_user_id: uid.clone(),
                target_email: before.email.clone(),
                prev_state: Some(json!({ "testerExpiresAt": current })),
                new_state: Some(json!({ "testerExpiresAt": new_expires_at })),
                metadata: Some(json!({ "daysAdded": TESTER_EXTENSION_DAYS })),
            })
            .await?;

        tracing::info!(
            admin_uid = %admin.uid,
            target_uid = %uid,
            new_expires_at = %new_expires_at,
            "Tester override extended"
        );

        Ok(new_expires_at)
    }
}
