//! Admin gate shared by every privileged command.

use crate::error::{AdminError, Result};
use crate::store::UserStore;
use crate::types::{CallerIdentity, UserRecord};

/// Require an authenticated caller whose user record has `role == admin`.
///
/// Runs before any payload validation, so a non-admin always sees
/// `permission-denied` whatever the payload.
pub async fn require_admin(
    users: &dyn UserStore,
    caller: Option<&CallerIdentity>,
) -> Result<UserRecord> {
    let caller = caller.ok_or(AdminError::Unauthenticated)?;

    match users.get(&caller.uid).await? {
        Some(record) if record.is_admin() => Ok(record),
        _ => {
            tracing::debug!(caller_uid = %caller.uid, "Rejected non-admin caller");
            Err(AdminError::PermissionDenied)
        }
    }
}
