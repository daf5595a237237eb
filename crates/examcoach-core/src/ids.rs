//! Strongly Typed Identifiers
//!
//! Document keys in the entitlement store are opaque strings issued by the
//! identity provider (user ids) or by the store itself (issue documents).
//! The newtypes keep them from being mixed up at compile time.
//!
//! # Example
//!
//! ```
//! use examcoach_core::{IssueDocId, UserId};
//!
//! let user = UserId::new("uid-123");
//! let issue = IssueDocId::generate();
//!
//! fn requires_user(id: &UserId) -> String {
//!     id.to_string()
//! }
//!
//! assert_eq!(requires_user(&user), "uid-123");
//! // requires_user(&issue); // This would not compile!
//! # let _ = issue;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Sentinel actor recorded on audit entries written by automated jobs.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// Macro to define a strongly-typed string ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the ID, returning the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifier of a user record, shared with the identity provider account.
    UserId
);

define_id!(
    /// Document identifier of a support-issue record.
    IssueDocId
);

define_id!(
    /// Who performed a privileged action: an admin uid or the system sentinel.
    ActorId
);

impl IssueDocId {
    /// Generates a fresh random document id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl ActorId {
    /// The sentinel actor used by automated jobs.
    #[must_use]
    pub fn system() -> Self {
        Self(SYSTEM_ACTOR.to_string())
    }

    /// Returns true for the automated-job sentinel.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_ACTOR
    }
}

impl From<&UserId> for ActorId {
    fn from(id: &UserId) -> Self {
        Self(id.0.clone())
    }
}
