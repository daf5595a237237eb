//! Aggregate admin counters.
//!
//! Counters are advisory. [`StatsRecorder::record`] runs the increment on a
//! detached task, so a slow or failing stats store never delays or fails the
//! command that triggered it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::error::{AdminError, Result};

/// A named counter in the stats document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatCounter {
    /// Tester grants.
    TestersGranted,
    /// Manual tester revocations.
    TestersRevoked,
    /// Accounts disabled.
    UsersDisabled,
}

impl std::fmt::Display for StatCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TestersGranted => write!(f, "testersGranted"),
            Self::TestersRevoked => write!(f, "testersRevoked"),
            Self::UsersDisabled => write!(f, "usersDisabled"),
        }
    }
}

/// The stats document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Total tester grants.
    pub testers_granted: u64,
    /// Total manual tester revocations.
    pub testers_revoked: u64,
    /// Total account disables.
    pub users_disabled: u64,
    /// Last increment.
    pub updated_at: Option<DateTime<Utc>>,
}

impl AdminStats {
    /// Current value of `counter`.
    #[must_use]
    pub fn get(&self, counter: StatCounter) -> u64 {
        match counter {
            StatCounter::TestersGranted => self.testers_granted,
            StatCounter::TestersRevoked => self.testers_revoked,
            StatCounter::UsersDisabled => self.users_disabled,
        }
    }

    fn slot(&mut self, counter: StatCounter) -> &mut u64 {
        match counter {
            StatCounter::TestersGranted => &mut self.testers_granted,
            StatCounter::TestersRevoked => &mut self.testers_revoked,
            StatCounter::UsersDisabled => &mut self.users_disabled,
        }
    }
}

/// Trait for stats storage backends.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Atomically add `by` to `counter`.
    async fn increment(&self, counter: StatCounter, by: u64, now: DateTime<Utc>) -> Result<()>;

    /// Read the stats document.
    async fn get(&self) -> Result<AdminStats>;
}

/// In-memory stats store.
#[derive(Debug, Default)]
pub struct InMemoryStatsStore {
    stats: Arc<RwLock<AdminStats>>,
    unavailable: AtomicBool,
}

impl InMemoryStatsStore {
    /// Create a zeroed store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make increments fail (for testing).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn increment(&self, counter: StatCounter, by: u64, now: DateTime<Utc>) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AdminError::Store("stats document unavailable".to_string()));
        }
        let mut stats = self.stats.write().await;
        *stats.slot(counter) += by;
        stats.updated_at = Some(now);
        Ok(())
    }

    async fn get(&self) -> Result<AdminStats> {
        Ok(self.stats.read().await.clone())
    }
}

/// Fire-and-forget counter increments.
#[derive(Clone)]
pub struct StatsRecorder {
    store: Arc<dyn StatsStore>,
    clock: Arc<dyn Clock>,
}

impl StatsRecorder {
    /// Create a recorder over `store`.
    pub fn new(store: Arc<dyn StatsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Increment `counter` by one on a detached task.
    ///
    /// Must be called from within a tokio runtime. Callers on the command
    /// path drop the handle; failures are logged at `warn`.
    pub fn record(&self, counter: StatCounter) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let now = self.clock.now();
        tokio::spawn(async move {
            if let Err(e) = store.increment(counter, 1, now).await {
                tracing::warn!(counter = %counter, error = %e, "Failed to update admin stats");
            }
        })
    }

    /// Read the current stats document.
    pub async fn snapshot(&self) -> Result<AdminStats> {
        self.store.get().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn recorder(store: Arc<InMemoryStatsStore>) -> StatsRecorder {
        StatsRecorder::new(store, Arc::new(FixedClock::new(Utc::now())))
    }

    #[tokio::test]
    async fn test_record_increments_counter() {
        let store = Arc::new(InMemoryStatsStore::new());
        let recorder = recorder(Arc::clone(&store));

        recorder.record(StatCounter::TestersGranted).await.unwrap();
        recorder.record(StatCounter::TestersGranted).await.unwrap();
        recorder.record(StatCounter::UsersDisabled).await.unwrap();

        let stats = recorder.snapshot().await.unwrap();
        assert_eq!(stats.testers_granted, 2);
        assert_eq!(stats.users_disabled, 1);
        assert_eq!(stats.testers_revoked, 0);
        assert!(stats.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let store = Arc::new(InMemoryStatsStore::new());
        store.set_unavailable(true);
        let recorder = recorder(Arc::clone(&store));

        // The task completes without panicking
        recorder.record(StatCounter::TestersRevoked).await.unwrap();
        assert_eq!(store.get().await.unwrap().testers_revoked, 0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = AdminStats {
            testers_granted: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["testersGranted"], 3);
        assert_eq!(json["usersDisabled"], 0);
        assert_eq!(StatCounter::UsersDisabled.to_string(), "usersDisabled");
    }
}
