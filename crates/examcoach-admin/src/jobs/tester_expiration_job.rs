//! Tester Expiration Job.
//!
//! Revokes tester overrides whose expiry has passed. This job:
//! 1. Queries user records with `testerOverride == true` and `testerExpiresAt < now`
//! 2. Splits them into chunks that fit one store batch
//! 3. Per chunk, commits the user updates and then the `auto-expire` audit records
//!
//! The two batches of a chunk are independent. A failed user batch leaves those
//! users for the next cycle; a failed audit batch after a committed user batch
//! loses those audit records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use examcoach_core::ActorId;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::audit::{AdminAuditAction, AdminAuditEventInput, AuditStore};
use crate::clock::Clock;
use crate::error::AdminError;
use crate::store::{UserBatchWrite, UserStore};
use crate::types::{UserPatch, UserRecord, MAX_BATCH_WRITES};

/// Default polling interval in seconds (6 hours).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 21600;

/// Job that clears lapsed tester overrides in bulk.
pub struct TesterExpirationJob {
    users: Arc<dyn UserStore>,
    audit_store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
    chunk_size: usize,
}

/// Statistics from one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TesterExpirationStats {
    /// Records matched by the expiry query.
    pub matched: usize,
    /// Records whose override was cleared.
    pub expired: usize,
    /// Audit records written.
    pub audit_records: usize,
    /// User batches that failed to commit.
    pub failed_batches: usize,
    /// Audit batches that failed after their user batch committed.
    pub failed_audit_batches: usize,
    /// Chunks processed.
    pub batches: usize,
}

impl TesterExpirationStats {
    /// Merge stats from another instance.
    pub fn merge(&mut self, other: &TesterExpirationStats) {
        self.matched += other.matched;
        self.expired += other.expired;
        self.audit_records += other.audit_records;
        self.failed_batches += other.failed_batches;
        self.failed_audit_batches += other.failed_audit_batches;
        self.batches += other.batches;
    }

    /// Returns the total number of actions taken (expired + audited).
    #[must_use]
    pub fn total_actions(&self) -> usize {
        self.expired + self.audit_records
    }

    /// Whether any batch failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_batches + self.failed_audit_batches > 0
    }
}

/// Errors that can occur during tester expiration job execution.
#[derive(Debug, thiserror::Error)]
pub enum TesterExpirationJobError {
    /// The expiry query failed; nothing was written.
    #[error("Query error: {0}")]
    Query(#[source] AdminError),
}

impl TesterExpirationJob {
    /// Create a new tester expiration job.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        audit_store: Arc<dyn AuditStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            audit_store,
            clock,
            chunk_size: MAX_BATCH_WRITES,
        }
    }

    /// Use a smaller chunk size. Values outside `1..=MAX_BATCH_WRITES` are clamped.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_BATCH_WRITES);
        self
    }

    /// Run a single sweep.
    ///
    /// Batch failures are logged and counted; only a failed expiry query is
    /// returned as an error.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<TesterExpirationStats, TesterExpirationJobError> {
        let now = self.clock.now();
        debug!(%now, "Starting tester expiration sweep");

        let expired = self.users.find_expired_testers(now).await.map_err(|e| {
            error!(error = %e, "Failed to query expired testers");
            TesterExpirationJobError::Query(e)
        })?;

        if expired.is_empty() {
            debug!("No expired testers found");
            return Ok(TesterExpirationStats::default());
        }

        info!(matched = expired.len(), "Found expired testers");

        let mut stats = TesterExpirationStats::default();
        for chunk in expired.chunks(self.chunk_size) {
            let chunk_stats = self.process_chunk(chunk, now).await;
            stats.merge(&chunk_stats);
        }

        if stats.has_failures() {
            warn!(
                matched = stats.matched,
                expired = stats.expired,
                audit_records = stats.audit_records,
                failed_batches = stats.failed_batches,
                failed_audit_batches = stats.failed_audit_batches,
                "Tester expiration sweep finished with failures"
            );
        } else {
            info!(
                expired = stats.expired,
                batches = stats.batches,
                "Completed tester expiration sweep"
            );
        }

        Ok(stats)
    }

    /// Commit one chunk as a user batch followed by an audit batch.
    ///
    /// Does not propagate errors so one failing chunk does not stop the sweep.
    async fn process_chunk(
        &self,
        chunk: &[UserRecord],
        now: DateTime<Utc>,
    ) -> TesterExpirationStats {
        let mut stats = TesterExpirationStats {
            matched: chunk.len(),
            batches: 1,
            ..Default::default()
        };

        let writes: Vec<UserBatchWrite> = chunk
            .iter()
            .map(|user| UserBatchWrite {
                uid: user.uid.clone(),
                patch: UserPatch::end_tester_override(user, now),
            })
            .collect();

        if let Err(e) = self.users.commit_batch(writes).await {
            error!(
                error = %e,
                chunk_size = chunk.len(),
                "Failed to commit tester expiration batch; next sweep will retry"
            );
            stats.failed_batches += 1;
            return stats;
        }
        stats.expired = chunk.len();

        let audit_inputs: Vec<AdminAuditEventInput> =
            chunk.iter().map(|user| auto_expire_event(user, now)).collect();

        match self.audit_store.log_batch(audit_inputs).await {
            Ok(events) => stats.audit_records = events.len(),
            Err(e) => {
                warn!(
                    error = %e,
                    chunk_size = chunk.len(),
                    "Failed to write auto-expire audit batch"
                );
                stats.failed_audit_batches += 1;
            }
        }

        stats
    }
}

fn auto_expire_event(user: &UserRecord, now: DateTime<Utc>) -> AdminAuditEventInput {
    AdminAuditEventInput {
        action: AdminAuditAction::AutoExpire,
        admin_uid: ActorId::system(),
        target_user_id: user.uid.clone(),
        target_email: user.email.clone(),
        prev_state: Some(json!({
            "testerOverride": user.tester_override,
            "isPro": user.is_pro,
            "testerExpiresAt": user.tester_expires_at,
        })),
        new_state: Some(json!({
            "testerOverride": false,
            "isPro": false,
        })),
        metadata: Some(json!({
            "expiredAt": now,
            "billingPreserved": user.is_stripe_verified(),
        })),
    }
}
