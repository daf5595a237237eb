//! HTTP handlers for the admin callables.

pub mod account;
pub mod audit;
pub mod issues;
pub mod stats;
pub mod tester;

pub use account::{disable_user_handler, update_email_handler};
pub use audit::list_audit_log_handler;
pub use issues::submit_issue_handler;
pub use stats::get_admin_stats_handler;
pub use tester::{extend_tester_handler, grant_tester_handler, revoke_tester_handler};

use examcoach_admin::services::require_admin;
use examcoach_admin::{CallerIdentity, UserStore};
use serde::de::DeserializeOwned;

use crate::error::ApiResult;
use crate::models::Callable;

/// Decode an admin-only payload.
///
/// A payload that does not decode is reported as `INVALID_ARGUMENT` only
/// once the caller has passed the admin gate; everyone else gets the
/// authorization failure. Well-typed payloads go straight to the service,
/// which runs the gate itself.
pub(crate) async fn decode_admin_payload<T>(
    payload: Callable,
    users: &dyn UserStore,
    caller: Option<&CallerIdentity>,
) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    match payload.decode() {
        Ok(request) => Ok(request),
        Err(e) => {
            require_admin(users, caller).await?;
            Err(e)
        }
    }
}
