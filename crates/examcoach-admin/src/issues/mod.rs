//! Support-issue identifiers.
//!
//! - [`store`] - issue records and the [`IssueStore`] trait
//! - [`events`] - issue-created broadcast channel
//! - [`display_id`] - `<PREFIX>-<n>` parsing
//! - [`assigner`] - fallback identifier assignment on create
//! - [`consumer`] - channel subscriber driving the assigner

pub mod assigner;
pub mod consumer;
pub mod display_id;
pub mod events;
pub mod store;

pub use assigner::IssueIdAssigner;
pub use consumer::IssueCreatedConsumer;
pub use events::{IssueCreated, IssueEventPublisher, DEFAULT_EVENT_CAPACITY};
pub use store::{InMemoryIssueStore, IssueRecord, IssueStore, NewIssue};
