//! Subscriber that runs the display-id assigner for every created issue.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::issues::assigner::IssueIdAssigner;
use crate::issues::events::IssueCreated;

/// Drives [`IssueIdAssigner`] from the issue-created channel.
pub struct IssueCreatedConsumer {
    assigner: Arc<IssueIdAssigner>,
    receiver: broadcast::Receiver<IssueCreated>,
}

impl IssueCreatedConsumer {
    /// Create a consumer reading from `receiver`.
    pub fn new(
        assigner: Arc<IssueIdAssigner>,
        receiver: broadcast::Receiver<IssueCreated>,
    ) -> Self {
        Self { assigner, receiver }
    }

    /// Process events until `shutdown` is cancelled or the channel closes.
    ///
    /// Events are handled one at a time. Returns the number of events handled.
    pub async fn run(mut self, shutdown: CancellationToken) -> usize {
        let mut handled = 0;
        info!("Issue-created consumer started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("Issue-created consumer shutdown requested");
                    break;
                }
                event = self.receiver.recv() => match event {
                    Ok(event) => {
                        self.assigner.on_issue_created(&event.issue_id).await;
                        handled += 1;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Dropped events leave those issues without a fallback id
                        warn!(skipped, "Issue-created consumer lagged behind");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Issue-created channel closed");
                        break;
                    }
                },
            }
        }

        info!(handled, "Issue-created consumer stopped");
        handled
    }
}
