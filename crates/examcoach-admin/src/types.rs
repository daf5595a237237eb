//! Type definitions for the entitlement domain.
//!
//! Field names serialize in camelCase to match the stored user documents.

use chrono::{DateTime, Duration, Utc};
use examcoach_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Length of a fresh tester grant.
pub const TESTER_GRANT_DAYS: i64 = 14;

/// Days added to the current expiry by each extension.
pub const TESTER_EXTENSION_DAYS: i64 = 7;

/// Per-batch write limit of the document store.
pub const MAX_BATCH_WRITES: usize = 500;

/// Duration of a fresh tester grant.
#[must_use]
pub fn tester_grant_duration() -> Duration {
    Duration::days(TESTER_GRANT_DAYS)
}

/// Duration added by one extension.
#[must_use]
pub fn tester_extension_duration() -> Duration {
    Duration::days(TESTER_EXTENSION_DAYS)
}

// ============================================================================
// Enums
// ============================================================================

/// Authorization role stored on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May invoke admin callables.
    Admin,
    /// Regular app user.
    #[default]
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

/// Billing state of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    /// Nothing known.
    #[default]
    Unknown,
    /// Entitled through a manual tester grant.
    Tester,
    /// Paid subscription in good standing.
    Active,
    /// Paid subscription in its trial period.
    Trialing,
    /// Payment failed, still in grace.
    PastDue,
    /// Subscription ended.
    Canceled,
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Tester => write!(f, "tester"),
            Self::Active => write!(f, "active"),
            Self::Trialing => write!(f, "trialing"),
            Self::PastDue => write!(f, "past_due"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Who established the billing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingSource {
    /// Set by an admin action.
    Manual,
    /// Verified by the payment processor. Never overwritten by tester logic.
    Stripe,
}

impl fmt::Display for BillingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Stripe => write!(f, "stripe"),
        }
    }
}

// ============================================================================
// User record
// ============================================================================

/// A user document in the entitlement store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Document key, shared with the identity provider.
    pub uid: UserId,
    /// Authorization role.
    #[serde(default)]
    pub role: Role,
    /// Effective entitlement flag read by the client app.
    #[serde(default)]
    pub is_pro: bool,
    /// True while a time-boxed tester grant is active.
    #[serde(default)]
    pub tester_override: bool,
    /// When the tester override lapses.
    #[serde(default)]
    pub tester_expires_at: Option<DateTime<Utc>>,
    /// Admin who granted the override.
    #[serde(default)]
    pub tester_granted_by: Option<UserId>,
    /// When the override was granted.
    #[serde(default)]
    pub tester_granted_at: Option<DateTime<Utc>>,
    /// Billing state.
    #[serde(default)]
    pub billing_status: BillingStatus,
    /// Billing provenance.
    #[serde(default)]
    pub billing_source: Option<BillingSource>,
    /// Account-level lockout, mirrored from the identity provider.
    #[serde(default)]
    pub disabled: bool,
    /// Denormalized email for audit readability.
    #[serde(default)]
    pub email: Option<String>,
    /// When created.
    pub created_at: DateTime<Utc>,
    /// When last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// A fresh `user`-role record with no entitlements.
    pub fn new(uid: impl Into<UserId>, created_at: DateTime<Utc>) -> Self {
        Self {
            uid: uid.into(),
            role: Role::User,
            is_pro: false,
            tester_override: false,
            tester_expires_at: None,
            tester_granted_by: None,
            tester_granted_at: None,
            billing_status: BillingStatus::Unknown,
            billing_source: None,
            disabled: false,
            email: None,
            created_at,
            updated_at: None,
        }
    }

    /// Builder-style email setter.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder-style role setter.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Billing verified by the payment processor.
    #[must_use]
    pub fn is_stripe_verified(&self) -> bool {
        self.billing_source == Some(BillingSource::Stripe)
    }

    /// Whether the override is set and its expiry is strictly before `now`.
    #[must_use]
    pub fn tester_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.tester_override && self.tester_expires_at.is_some_and(|exp| exp < now)
    }

    /// Apply a patch in place.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(is_pro) = patch.is_pro {
            self.is_pro = is_pro;
        }
        if let Some(tester_override) = patch.tester_override {
            self.tester_override = tester_override;
        }
        if let Some(expires_at) = patch.tester_expires_at {
            self.tester_expires_at = expires_at;
        }
        if let Some(granted_by) = &patch.tester_granted_by {
            self.tester_granted_by = Some(granted_by.clone());
        }
        if let Some(granted_at) = patch.tester_granted_at {
            self.tester_granted_at = Some(granted_at);
        }
        if let Some(status) = patch.billing_status {
            self.billing_status = status;
        }
        if let Some(source) = patch.billing_source {
            self.billing_source = source;
        }
        if let Some(disabled) = patch.disabled {
            self.disabled = disabled;
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = Some(updated_at);
        }
    }
}

/// Partial update of a user record.
///
/// `None` leaves a field untouched; nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    /// New role.
    pub role: Option<Role>,
    /// New `isPro`.
    pub is_pro: Option<bool>,
    /// New `testerOverride`.
    pub tester_override: Option<bool>,
    /// New `testerExpiresAt` (`Some(None)` clears).
    pub tester_expires_at: Option<Option<DateTime<Utc>>>,
    /// New `testerGrantedBy`.
    pub tester_granted_by: Option<UserId>,
    /// New `testerGrantedAt`.
    pub tester_granted_at: Option<DateTime<Utc>>,
    /// New `billingStatus`.
    pub billing_status: Option<BillingStatus>,
    /// New `billingSource` (`Some(None)` clears).
    pub billing_source: Option<Option<BillingSource>>,
    /// New `disabled`.
    pub disabled: Option<bool>,
    /// New email.
    pub email: Option<String>,
    /// Update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    /// The field changes that end a tester override, shared by manual revoke
    /// and the expiration sweep.
    ///
    /// `isPro` is cleared unconditionally; billing fields are reset only when
    /// they were not verified by the payment processor.
    #[must_use]
    pub fn end_tester_override(current: &UserRecord, now: DateTime<Utc>) -> Self {
        let mut patch = Self {
            tester_override: Some(false),
            tester_expires_at: Some(None),
            is_pro: Some(false),
            updated_at: Some(now),
            ..Default::default()
        };
        if !current.is_stripe_verified() {
            patch.billing_status = Some(BillingStatus::Unknown);
            patch.billing_source = Some(None);
        }
        patch
    }
}

/// Authenticated caller of a callable operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Verified uid of the caller.
    pub uid: UserId,
}

impl CallerIdentity {
    /// Create a caller identity.
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self { uid: uid.into() }
    }
}
