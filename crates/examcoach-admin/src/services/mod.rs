//! Service layer for the admin commands.
//!
//! Every command authorizes the caller with [`authorization::require_admin`]
//! before it looks at the payload, then issues its writes in a fixed order
//! and appends exactly one audit record on success.

pub mod account;
pub mod authorization;
pub mod tester;
pub mod validation;

pub use account::AccountService;
pub use authorization::require_admin;
pub use tester::TesterService;
pub use validation::{validate_email, validate_target_uid};
