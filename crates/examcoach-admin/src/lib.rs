//! Admin domain logic for Exam Coach.
//!
//! This crate provides the entitlement lifecycle behind the admin callables,
//! the scheduled tester expiration sweep and the support-issue identifier
//! trigger.
//!
//! # Services
//!
//! The [`services`] module provides:
//! - [`services::TesterService`] - grant, revoke and extend tester overrides
//! - [`services::AccountService`] - disable/enable accounts and change emails
//! - [`services::require_admin`] - the admin gate every command runs first
//!
//! # Jobs
//!
//! - [`jobs::TesterExpirationJob`] - clears lapsed tester overrides in bulk
//!
//! # Issues
//!
//! - [`issues::IssueIdAssigner`] - fallback `EC-<n>` identifiers on create
//! - [`issues::IssueCreatedConsumer`] - drives the assigner from the event channel
//!
//! # Audit
//!
//! The [`audit`] module records one immutable [`audit::AdminAuditEvent`] per
//! privileged change through the pluggable [`audit::AuditStore`] trait.

pub mod audit;
pub mod clock;
pub mod error;
pub mod identity;
pub mod issues;
pub mod jobs;
pub mod services;
pub mod stats;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use audit::{
    AdminAuditAction, AdminAuditEvent, AdminAuditEventInput, AuditEventFilter, AuditStore,
    InMemoryAuditStore,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AdminError, IdentityError, Result};
pub use identity::{IdentityAccount, IdentityProvider, InMemoryIdentityProvider};
pub use issues::{
    IssueCreated, IssueCreatedConsumer, IssueEventPublisher, IssueIdAssigner, IssueRecord,
    IssueStore, InMemoryIssueStore, NewIssue,
};
pub use jobs::{TesterExpirationJob, TesterExpirationJobError, TesterExpirationStats};
pub use services::{AccountService, TesterService};
pub use stats::{AdminStats, InMemoryStatsStore, StatCounter, StatsRecorder, StatsStore};
pub use store::{InMemoryUserStore, UserBatchWrite, UserStore};
pub use types::{
    BillingSource, BillingStatus, CallerIdentity, Role, UserPatch, UserRecord,
    MAX_BATCH_WRITES, TESTER_EXTENSION_DAYS, TESTER_GRANT_DAYS,
};
