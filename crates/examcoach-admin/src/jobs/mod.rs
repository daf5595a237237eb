//! Background jobs for the admin backend.
//!
//! - Tester expiration - revokes lapsed tester overrides every six hours

pub mod tester_expiration_job;

pub use tester_expiration_job::{
    TesterExpirationJob, TesterExpirationJobError, TesterExpirationStats,
    DEFAULT_POLL_INTERVAL_SECS,
};
