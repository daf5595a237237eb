//! Periodic driver for the tester expiration sweep.

use std::time::Duration;

use examcoach_admin::TesterExpirationJob;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Run `job` every `interval` until `shutdown` is cancelled.
///
/// The first sweep happens one interval after startup. A failed sweep is
/// logged and the schedule continues. Returns the number of sweeps run.
pub async fn run_sweeper(
    job: TesterExpirationJob,
    interval: Duration,
    shutdown: CancellationToken,
) -> usize {
    let mut sweeps = 0;
    info!(interval_secs = interval.as_secs(), "Tester expiration sweeper started");

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                debug!("Tester expiration sweeper shutdown requested");
                break;
            }
            () = tokio::time::sleep(interval) => {
                sweeps += 1;
                match job.run_once().await {
                    Ok(stats) if stats.total_actions() > 0 => {
                        info!(
                            target: "tester_expiration",
                            expired = stats.expired,
                            audit_records = stats.audit_records,
                            "Tester expiration sweep applied changes"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(
                            target: "tester_expiration",
                            error = %e,
                            "Tester expiration sweep failed"
                        );
                    }
                }
            }
        }
    }

    info!(sweeps, "Tester expiration sweeper stopped");
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use examcoach_admin::{
        Clock, FixedClock, InMemoryAuditStore, InMemoryUserStore, UserRecord, UserStore,
    };
    use examcoach_core::UserId;

    #[tokio::test]
    async fn test_sweeper_runs_until_cancelled() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let users = Arc::new(InMemoryUserStore::new());
        let audit = Arc::new(InMemoryAuditStore::new());

        let mut tester = UserRecord::new("lapsed", clock.now());
        tester.tester_override = true;
        tester.is_pro = true;
        tester.tester_expires_at = Some(clock.now() - chrono::Duration::hours(1));
        users.put(tester).await.unwrap();

        let job = TesterExpirationJob::new(users.clone(), audit.clone(), clock.clone());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_sweeper(
            job,
            Duration::from_millis(5),
            shutdown.clone(),
        ));

        for _ in 0..200 {
            if audit.count().await > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        shutdown.cancel();
        let sweeps = handle.await.unwrap();

        assert!(sweeps >= 1);
        let user = users.get(&UserId::new("lapsed")).await.unwrap().unwrap();
        assert!(!user.tester_override);
        assert_eq!(audit.count().await, 1);
    }

    #[tokio::test]
    async fn test_sweeper_stops_before_first_tick() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let job = TesterExpirationJob::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryAuditStore::new()),
            clock,
        );
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let sweeps = run_sweeper(job, Duration::from_secs(3600), shutdown).await;
        assert_eq!(sweeps, 0);
    }
}
