//! Admin callable API for Exam Coach.
//!
//! Exposes the admin commands as HTTP callables using the callable envelope
//! (`{"data": ...}` in, `{"result": ...}` or `{"error": ...}` out).
//!
//! # Example
//!
//! ```rust,ignore
//! use examcoach_api_admin::{admin_router, AdminState};
//!
//! let state = AdminState::new(users, audit, stats, issues, identity, clock);
//! let app = admin_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;

pub use error::{ApiAdminError, ApiResult};
pub use router::{admin_router, AdminState};
