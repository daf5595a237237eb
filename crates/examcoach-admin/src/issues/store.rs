//! Support-issue records.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use examcoach_core::{IssueDocId, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{AdminError, Result};
use crate::issues::events::{IssueCreated, IssueEventPublisher};

/// A support issue reported from one of the client apps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    /// Document id.
    pub id: IssueDocId,
    /// Human-readable identifier, e.g. `EC-12`. Immutable once assigned.
    #[serde(default)]
    pub display_id: Option<String>,
    /// Legacy copy of the display identifier.
    #[serde(default)]
    pub issue_id: Option<String>,
    /// Short summary.
    pub title: String,
    /// Free-form details.
    #[serde(default)]
    pub description: Option<String>,
    /// Reporter-chosen category.
    #[serde(default)]
    pub category: Option<String>,
    /// Client app that filed the issue.
    #[serde(default)]
    pub source_app: Option<String>,
    /// Reporting user.
    #[serde(default)]
    pub reporter_uid: Option<UserId>,
    /// When created.
    pub created_at: DateTime<Utc>,
    /// When last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating an issue record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    /// Short summary.
    pub title: String,
    /// Free-form details.
    pub description: Option<String>,
    /// Reporter-chosen category.
    pub category: Option<String>,
    /// Client app that filed the issue.
    pub source_app: Option<String>,
    /// Identifier assigned by the client, if any.
    pub display_id: Option<String>,
    /// Reporting user.
    pub reporter_uid: Option<UserId>,
}

/// Trait for issue storage backends.
#[async_trait::async_trait]
pub trait IssueStore: Send + Sync {
    /// Create a record and fire the creation trigger.
    async fn create(&self, input: NewIssue, now: DateTime<Utc>) -> Result<IssueRecord>;

    /// Get an issue by document id.
    async fn get(&self, id: &IssueDocId) -> Result<Option<IssueRecord>>;

    /// The most recent `limit` issues, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<IssueRecord>>;

    /// Merge `displayId`, the legacy `issueId` and `updatedAt` onto a record.
    async fn assign_display_id(
        &self,
        id: &IssueDocId,
        display_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()>;
}

/// In-memory issue store.
#[derive(Debug)]
pub struct InMemoryIssueStore {
    issues: Arc<RwLock<HashMap<IssueDocId, IssueRecord>>>,
    publisher: Option<IssueEventPublisher>,
}

impl Default for InMemoryIssueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIssueStore {
    /// Create a store that fires no events.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issues: Arc::new(RwLock::new(HashMap::new())),
            publisher: None,
        }
    }

    /// Create a store that publishes [`IssueCreated`] on every create.
    #[must_use]
    pub fn with_publisher(publisher: IssueEventPublisher) -> Self {
        Self {
            issues: Arc::new(RwLock::new(HashMap::new())),
            publisher: Some(publisher),
        }
    }

    /// Insert a record as-is without firing the trigger (for seeding).
    pub async fn insert(&self, record: IssueRecord) {
        self.issues.write().await.insert(record.id.clone(), record);
    }

    /// Number of stored issues.
    pub async fn count(&self) -> usize {
        self.issues.read().await.len()
    }
}

#[async_trait::async_trait]
impl IssueStore for InMemoryIssueStore {
    async fn create(&self, input: NewIssue, now: DateTime<Utc>) -> Result<IssueRecord> {
        let record = IssueRecord {
            id: IssueDocId::generate(),
            issue_id: input.display_id.clone(),
            display_id: input.display_id,
            title: input.title,
            description: input.description,
            category: input.category,
            source_app: input.source_app,
            reporter_uid: input.reporter_uid,
            created_at: now,
            updated_at: None,
        };

        self.issues
            .write()
            .await
            .insert(record.id.clone(), record.clone());

        if let Some(publisher) = &self.publisher {
            publisher.publish(IssueCreated {
                issue_id: record.id.clone(),
                created_at: now,
            });
        }

        Ok(record)
    }

    async fn get(&self, id: &IssueDocId) -> Result<Option<IssueRecord>> {
        Ok(self.issues.read().await.get(id).cloned())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<IssueRecord>> {
        let issues = self.issues.read().await;
        let mut results: Vec<_> = issues.values().cloned().collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(limit);
        Ok(results)
    }

    async fn assign_display_id(
        &self,
        id: &IssueDocId,
        display_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut issues = self.issues.write().await;
        let issue = issues
            .get_mut(id)
            .ok_or_else(|| AdminError::Store(format!("issue {id} not found")))?;
        issue.display_id = Some(display_id.to_string());
        issue.issue_id = Some(display_id.to_string());
        issue.updated_at = Some(now);
        Ok(())
    }
}
