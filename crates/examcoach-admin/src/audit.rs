//! Audit logging for privileged state changes.
//!
//! Every successful admin command and every automated expiry appends exactly
//! one [`AdminAuditEvent`]. Records are immutable: the [`AuditStore`] trait
//! has no update or delete.
//!
//! # Example
//!
//! ```rust,ignore
//! use examcoach_admin::audit::{AdminAuditAction, AdminAuditEventInput, AuditStore, InMemoryAuditStore};
//! use examcoach_core::{ActorId, UserId};
//!
//! let store = InMemoryAuditStore::new();
//! let event = store
//!     .log_event(AdminAuditEventInput::new(
//!         AdminAuditAction::GrantTester,
//!         ActorId::new("admin-1"),
//!         UserId::new("user-1"),
//!     ))
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use examcoach_core::{ActorId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AdminError, Result};
use crate::types::MAX_BATCH_WRITES;

/// Privileged action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminAuditAction {
    /// Tester override granted.
    GrantTester,
    /// Tester override revoked by an admin.
    RevokeTester,
    /// Tester expiry pushed out.
    ExtendTester,
    /// Account disabled.
    DisableUser,
    /// Account re-enabled.
    EnableUser,
    /// Account email changed by an admin.
    UpdateEmail,
    /// Tester override lapsed and was cleared by the sweeper.
    AutoExpire,
}

impl std::fmt::Display for AdminAuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GrantTester => write!(f, "grant-tester"),
            Self::RevokeTester => write!(f, "revoke-tester"),
            Self::ExtendTester => write!(f, "extend-tester"),
            Self::DisableUser => write!(f, "disable-user"),
            Self::EnableUser => write!(f, "enable-user"),
            Self::UpdateEmail => write!(f, "update-email"),
            Self::AutoExpire => write!(f, "auto-expire"),
        }
    }
}

/// An immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuditEvent {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// Action performed.
    pub action: AdminAuditAction,
    /// Admin who performed the action, or `SYSTEM`.
    pub admin_uid: ActorId,
    /// User the action was applied to.
    pub target_user_id: UserId,
    /// Denormalized target email.
    pub target_email: Option<String>,
    /// State before the change (JSON).
    pub prev_state: Option<serde_json::Value>,
    /// State after the change (JSON).
    pub new_state: Option<serde_json::Value>,
    /// Additional metadata.
    pub metadata: Option<serde_json::Value>,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an audit event.
///
/// There is no `Default`: every record names its action explicitly.
#[derive(Debug, Clone)]
pub struct AdminAuditEventInput {
    /// Action performed.
    pub action: AdminAuditAction,
    /// Admin who performed the action, or `SYSTEM`.
    pub admin_uid: ActorId,
    /// User the action was applied to.
    pub target_user_id: UserId,
    /// Denormalized target email.
    pub target_email: Option<String>,
    /// State before the change (JSON).
    pub prev_state: Option<serde_json::Value>,
    /// State after the change (JSON).
    pub new_state: Option<serde_json::Value>,
    /// Additional metadata.
    pub metadata: Option<serde_json::Value>,
}

impl AdminAuditEventInput {
    /// Input with only the required fields set.
    #[must_use]
    pub fn new(action: AdminAuditAction, admin_uid: ActorId, target_user_id: UserId) -> Self {
        Self {
            action,
            admin_uid,
            target_user_id,
            target_email: None,
            prev_state: None,
            new_state: None,
            metadata: None,
        }
    }

    fn into_event(self, created_at: DateTime<Utc>) -> AdminAuditEvent {
        AdminAuditEvent {
            id: Uuid::new_v4(),
            action: self.action,
            admin_uid: self.admin_uid,
            target_user_id: self.target_user_id,
            target_email: self.target_email,
            prev_state: self.prev_state,
            new_state: self.new_state,
            metadata: self.metadata,
            created_at,
        }
    }
}

/// Filter for querying audit events.
#[derive(Debug, Clone, Default)]
pub struct AuditEventFilter {
    /// Filter by target user.
    pub target_user_id: Option<UserId>,
    /// Filter by acting admin.
    pub admin_uid: Option<ActorId>,
    /// Filter by action type.
    pub action: Option<AdminAuditAction>,
    /// Filter by events after this date.
    pub from_date: Option<DateTime<Utc>>,
    /// Filter by events before this date.
    pub to_date: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Number of results to skip.
    pub offset: Option<usize>,
}

/// Trait for audit event storage backends.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one audit event.
    async fn log_event(&self, input: AdminAuditEventInput) -> Result<AdminAuditEvent>;

    /// Append a batch of audit events atomically.
    async fn log_batch(&self, inputs: Vec<AdminAuditEventInput>) -> Result<Vec<AdminAuditEvent>>;

    /// Query audit events, most recent first.
    async fn query_events(&self, filter: AuditEventFilter) -> Result<Vec<AdminAuditEvent>>;

    /// Get a specific audit event by ID.
    async fn get_event(&self, event_id: Uuid) -> Result<Option<AdminAuditEvent>>;
}

/// In-memory audit store for testing.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    events: Arc<RwLock<Vec<AdminAuditEvent>>>,
}

impl InMemoryAuditStore {
    /// Create a new in-memory audit store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get the count of events in the store.
    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Get all events in append order (for testing).
    pub async fn get_all(&self) -> Vec<AdminAuditEvent> {
        self.events.read().await.clone()
    }

    /// Clear all events (for testing).
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait::async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn log_event(&self, input: AdminAuditEventInput) -> Result<AdminAuditEvent> {
        let event = input.into_event(Utc::now());
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn log_batch(&self, inputs: Vec<AdminAuditEventInput>) -> Result<Vec<AdminAuditEvent>> {
        if inputs.len() > MAX_BATCH_WRITES {
            return Err(AdminError::BatchTooLarge {
                size: inputs.len(),
                limit: MAX_BATCH_WRITES,
            });
        }

        let now = Utc::now();
        let batch: Vec<_> = inputs.into_iter().map(|i| i.into_event(now)).collect();
        self.events.write().await.extend(batch.iter().cloned());
        Ok(batch)
    }

    async fn query_events(&self, filter: AuditEventFilter) -> Result<Vec<AdminAuditEvent>> {
        let events = self.events.read().await;
        let offset = filter.offset.unwrap_or(0);
        let limit = filter.limit.unwrap_or(usize::MAX);

        // Append order doubles as creation order, so reverse for most recent first
        Ok(events
            .iter()
            .rev()
            .filter(|e| {
                filter
                    .target_user_id
                    .as_ref()
                    .is_none_or(|id| &e.target_user_id == id)
            })
            .filter(|e| filter.admin_uid.as_ref().is_none_or(|id| &e.admin_uid == id))
            .filter(|e| filter.action.is_none_or(|a| e.action == a))
            .filter(|e| filter.from_date.is_none_or(|d| e.created_at >= d))
            .filter(|e| filter.to_date.is_none_or(|d| e.created_at <= d))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<AdminAuditEvent>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id == event_id).cloned())
    }
}
