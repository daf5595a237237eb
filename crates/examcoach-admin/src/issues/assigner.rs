//! Fallback display-id assignment for new issues.
//!
//! Client apps normally assign `displayId` themselves. When a record arrives
//! without a recognized one, the assigner scans the most recent
//! [`SCAN_WINDOW`] issues for the highest suffix and assigns the next
//! `EC-<n>`. Issues with older higher suffixes outside the window are not
//! seen, so a duplicate is possible after backfills.

use std::sync::Arc;

use examcoach_core::IssueDocId;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::issues::display_id::{fallback_display_id, has_valid_prefix, max_suffix, SCAN_WINDOW};
use crate::issues::store::IssueStore;

/// Creation trigger that assigns fallback display ids.
pub struct IssueIdAssigner {
    issues: Arc<dyn IssueStore>,
    clock: Arc<dyn Clock>,
}

impl IssueIdAssigner {
    /// Create a new assigner.
    pub fn new(issues: Arc<dyn IssueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { issues, clock }
    }

    /// Handle a newly created issue.
    ///
    /// Never fails: errors are logged and the issue is left as-is. Returns the
    /// identifier that was assigned, if any.
    #[instrument(skip(self), fields(issue_id = %issue_id))]
    pub async fn on_issue_created(&self, issue_id: &IssueDocId) -> Option<String> {
        match self.assign(issue_id).await {
            Ok(assigned) => assigned,
            Err(e) => {
                error!(error = %e, "Failed to assign issue display id");
                None
            }
        }
    }

    async fn assign(&self, issue_id: &IssueDocId) -> Result<Option<String>> {
        let Some(issue) = self.issues.get(issue_id).await? else {
            warn!("Issue disappeared before display id assignment");
            return Ok(None);
        };

        if issue.display_id.as_deref().is_some_and(has_valid_prefix) {
            debug!("Issue already carries a display id");
            return Ok(None);
        }

        let recent = self.issues.recent(SCAN_WINDOW).await?;
        let max = max_suffix(
            recent
                .iter()
                .flat_map(|i| [i.display_id.as_deref(), i.issue_id.as_deref()])
                .flatten(),
        );
        let display_id = fallback_display_id(max.saturating_add(1));

        self.issues
            .assign_display_id(issue_id, &display_id, self.clock.now())
            .await?;

        info!(display_id = %display_id, scanned = recent.len(), "Assigned fallback display id");
        Ok(Some(display_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::issues::store::{InMemoryIssueStore, NewIssue};
    use chrono::Utc;

    fn new_issue(display_id: Option<&str>) -> NewIssue {
        NewIssue {
            title: "Question text cut off".to_string(),
            display_id: display_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_issue_is_ignored() {
        let store = Arc::new(InMemoryIssueStore::new());
        let assigner = IssueIdAssigner::new(store, Arc::new(FixedClock::new(Utc::now())));
        assert!(assigner
            .on_issue_created(&IssueDocId::new("nope"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_prefix_is_replaced() {
        let store = Arc::new(InMemoryIssueStore::new());
        let now = Utc::now();
        let issue = store.create(new_issue(Some("XY-900")), now).await.unwrap();

        let assigner = IssueIdAssigner::new(store.clone(), Arc::new(FixedClock::new(now)));
        let assigned = assigner.on_issue_created(&issue.id).await;

        // XY-900 does not count toward the maximum
        assert_eq!(assigned.as_deref(), Some("EC-1"));
    }

    #[tokio::test]
    async fn test_first_issue_gets_ec_1() {
        let store = Arc::new(InMemoryIssueStore::new());
        let now = Utc::now();
        let issue = store.create(new_issue(None), now).await.unwrap();

        let assigner = IssueIdAssigner::new(store.clone(), Arc::new(FixedClock::new(now)));
        assert_eq!(
            assigner.on_issue_created(&issue.id).await.as_deref(),
            Some("EC-1")
        );
    }
}
