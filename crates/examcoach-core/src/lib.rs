//! Exam Coach Core Library
//!
//! Shared types for the Exam Coach admin functions.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (UserId, IssueDocId, ActorId)
//! - [`error`] - The callable error taxonomy (ErrorKind, CallableError)
//!
//! # Example
//!
//! ```
//! use examcoach_core::{ActorId, CallableError, ErrorKind, UserId};
//!
//! let target = UserId::new("uid-123");
//! let actor = ActorId::system();
//! assert!(actor.is_system());
//!
//! let err = CallableError::new(ErrorKind::NotFound, format!("User {target} not found"));
//! assert_eq!(err.kind.as_status(), "NOT_FOUND");
//! ```

pub mod error;
pub mod ids;

pub use error::{CallableError, ErrorKind};
pub use ids::{ActorId, IssueDocId, UserId, SYSTEM_ACTOR};
