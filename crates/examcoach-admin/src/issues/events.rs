//! Issue-created events on a tokio broadcast channel.
//!
//! The document store fires a creation trigger for every new issue record;
//! [`IssueEventPublisher`] is that trigger's in-process transport.

use chrono::{DateTime, Utc};
use examcoach_core::IssueDocId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A new issue record was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreated {
    /// Document id of the new record.
    pub issue_id: IssueDocId,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// Publisher that sends issue events to a broadcast channel.
#[derive(Debug, Clone)]
pub struct IssueEventPublisher {
    sender: broadcast::Sender<IssueCreated>,
}

impl IssueEventPublisher {
    /// Create a new publisher with the given channel capacity.
    pub fn new(capacity: usize) -> (Self, broadcast::Receiver<IssueCreated>) {
        let (sender, receiver) = broadcast::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Publish an event to all subscribers. Errors are logged, not propagated.
    pub fn publish(&self, event: IssueCreated) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!(
                issue_id = %e.0.issue_id,
                "No active subscribers to receive issue-created event"
            );
        }
    }

    /// Get a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<IssueCreated> {
        self.sender.subscribe()
    }
}
