//! Request and response models for the admin callables.

pub mod callable;
pub mod requests;
pub mod responses;

pub use callable::{Callable, CallableResponse};
pub use requests::{
    DisableUserRequest, ListAuditLogRequest, SubmitIssueRequest, TargetUserRequest,
    UpdateEmailRequest,
};
pub use responses::{AuditLogResponse, ExtendTesterResponse, SubmitIssueResponse, SuccessResponse};
