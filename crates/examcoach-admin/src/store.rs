//! User record storage.
//!
//! The document database is an external collaborator; [`UserStore`] captures
//! the primitives the admin functions rely on: single-document reads and
//! merges, a timestamp-range query, and atomic multi-document batches bounded
//! by [`MAX_BATCH_WRITES`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use examcoach_core::UserId;
use tokio::sync::RwLock;

use crate::error::{AdminError, Result};
use crate::types::{UserPatch, UserRecord, MAX_BATCH_WRITES};

/// One staged write in a user batch.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBatchWrite {
    /// Target document.
    pub uid: UserId,
    /// Fields to update.
    pub patch: UserPatch,
}

/// Trait for user record storage backends.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user record by uid.
    async fn get(&self, uid: &UserId) -> Result<Option<UserRecord>>;

    /// Create or replace a whole record.
    async fn put(&self, record: UserRecord) -> Result<()>;

    /// Update an existing record. Returns `None` when the record is absent.
    async fn update(&self, uid: &UserId, patch: &UserPatch) -> Result<Option<UserRecord>>;

    /// Merge fields onto a record, creating a minimal one if absent.
    async fn merge(
        &self,
        uid: &UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> Result<UserRecord>;

    /// All records with `testerOverride == true` and `testerExpiresAt < now`.
    async fn find_expired_testers(&self, now: DateTime<Utc>) -> Result<Vec<UserRecord>>;

    /// Apply every write atomically, or none of them.
    ///
    /// Fails with [`AdminError::BatchTooLarge`] above [`MAX_BATCH_WRITES`]
    /// and with [`AdminError::UserNotFound`] if any target is missing.
    async fn commit_batch(&self, writes: Vec<UserBatchWrite>) -> Result<()>;
}

/// In-memory user store for testing and local development.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
    writes: AtomicUsize,
}

impl InMemoryUserStore {
    /// Create a new in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of stored records.
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Number of document writes applied so far (for testing).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Get all records (for testing).
    pub async fn get_all(&self) -> Vec<UserRecord> {
        self.users.read().await.values().cloned().collect()
    }

    /// Clear all data.
    pub async fn clear(&self) {
        self.users.write().await.clear();
    }

    fn record_writes(&self, n: usize) {
        self.writes.fetch_add(n, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, uid: &UserId) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn put(&self, record: UserRecord) -> Result<()> {
        self.users.write().await.insert(record.uid.clone(), record);
        self.record_writes(1);
        Ok(())
    }

    async fn update(&self, uid: &UserId, patch: &UserPatch) -> Result<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(uid) else {
            return Ok(None);
        };
        user.apply(patch);
        self.record_writes(1);
        Ok(Some(user.clone()))
    }

    async fn merge(
        &self,
        uid: &UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> Result<UserRecord> {
        let mut users = self.users.write().await;
        let user = users
            .entry(uid.clone())
            .or_insert_with(|| UserRecord::new(uid.clone(), now));
        user.apply(patch);
        self.record_writes(1);
        Ok(user.clone())
    }

    async fn find_expired_testers(&self, now: DateTime<Utc>) -> Result<Vec<UserRecord>> {
        let users = self.users.read().await;
        let mut results: Vec<_> = users
            .values()
            .filter(|u| u.tester_expired_at(now))
            .cloned()
            .collect();

        // Stable order for callers that chunk the result
        results.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(results)
    }

    async fn commit_batch(&self, writes: Vec<UserBatchWrite>) -> Result<()> {
        if writes.len() > MAX_BATCH_WRITES {
            return Err(AdminError::BatchTooLarge {
                size: writes.len(),
                limit: MAX_BATCH_WRITES,
            });
        }

        let mut users = self.users.write().await;
        if let Some(missing) = writes.iter().find(|w| !users.contains_key(&w.uid)) {
            return Err(AdminError::UserNotFound(missing.uid.clone()));
        }

        let count = writes.len();
        for write in writes {
            if let Some(user) = users.get_mut(&write.uid) {
                user.apply(&write.patch);
            }
        }
        self.record_writes(count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn tester(uid: &str, expires_at: DateTime<Utc>) -> UserRecord {
        let mut user = UserRecord::new(uid, expires_at - Duration::days(14));
        user.tester_override = true;
        user.tester_expires_at = Some(expires_at);
        user.is_pro = true;
        user
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryUserStore::new();
        let now = Utc::now();
        store
            .put(UserRecord::new("u1", now).with_email("a@b.co"))
            .await
            .unwrap();

        let user = store.get(&UserId::new("u1")).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("a@b.co"));
        assert!(store.get(&UserId::new("u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryUserStore::new();
        let patch = UserPatch {
            is_pro: Some(true),
            ..Default::default()
        };
        let result = store.update(&UserId::new("ghost"), &patch).await.unwrap();
        assert!(result.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_merge_creates_missing_record() {
        let store = InMemoryUserStore::new();
        let now = Utc::now();
        let patch = UserPatch {
            disabled: Some(true),
            updated_at: Some(now),
            ..Default::default()
        };

        let user = store.merge(&UserId::new("new"), &patch, now).await.unwrap();
        assert!(user.disabled);
        assert_eq!(user.created_at, now);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_find_expired_testers() {
        let store = InMemoryUserStore::new();
        let now = Utc::now();
        store.put(tester("expired", now - Duration::hours(1))).await.unwrap();
        store.put(tester("active", now + Duration::hours(1))).await.unwrap();
        store.put(UserRecord::new("plain", now)).await.unwrap();

        let expired = store.find_expired_testers(now).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].uid.as_str(), "expired");
    }

    #[tokio::test]
    async fn test_commit_batch_rejects_oversized_batch() {
        let store = InMemoryUserStore::new();
        let writes = (0..=MAX_BATCH_WRITES)
            .map(|i| UserBatchWrite {
                uid: UserId::new(format!("u{i}")),
                patch: UserPatch::default(),
            })
            .collect();

        let err = store.commit_batch(writes).await.unwrap_err();
        assert!(matches!(err, AdminError::BatchTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_commit_batch_is_all_or_nothing() {
        let store = InMemoryUserStore::new();
        let now = Utc::now();
        store.put(UserRecord::new("u1", now)).await.unwrap();
        let before = store.write_count();

        let patch = UserPatch {
            is_pro: Some(true),
            ..Default::default()
        };
        let err = store
            .commit_batch(vec![
                UserBatchWrite {
                    uid: UserId::new("u1"),
                    patch: patch.clone(),
                },
                UserBatchWrite {
                    uid: UserId::new("missing"),
                    patch,
                },
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::UserNotFound(_)));
        let u1 = store.get(&UserId::new("u1")).await.unwrap().unwrap();
        assert!(!u1.is_pro);
        assert_eq!(store.write_count(), before);
    }
}
