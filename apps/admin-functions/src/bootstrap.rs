//! Development bootstrap: seeds an admin account into the in-memory backends.

use examcoach_admin::{Clock, InMemoryIdentityProvider, Result, Role, UserRecord, UserStore};
use tracing::{info, instrument};

use crate::config::BootstrapAdmin;

/// Seed `admin` as a user record with `role=admin` plus a matching identity
/// account and bearer token.
///
/// An existing record with the same uid is replaced.
///
/// # Errors
///
/// Returns the store error if the record cannot be written.
#[instrument(skip_all, fields(admin_uid = %admin.uid))]
pub async fn seed_admin(
    admin: &BootstrapAdmin,
    users: &dyn UserStore,
    identity: &InMemoryIdentityProvider,
    clock: &dyn Clock,
) -> Result<()> {
    let mut record = UserRecord::new(admin.uid.as_str(), clock.now()).with_role(Role::Admin);
    if let Some(email) = &admin.email {
        record = record.with_email(email.as_str());
    }
    users.put(record).await?;

    identity
        .add_account(admin.uid.as_str(), admin.email.clone())
        .await;
    identity
        .issue_token(admin.token.as_str(), admin.uid.as_str())
        .await;

    info!("bootstrap.completed: Admin account seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use examcoach_admin::{IdentityProvider, InMemoryUserStore, SystemClock};
    use examcoach_core::UserId;

    #[tokio::test]
    async fn test_seed_admin_is_usable() {
        let users = InMemoryUserStore::new();
        let identity = InMemoryIdentityProvider::new();
        let clock = SystemClock;
        let admin = BootstrapAdmin {
            uid: "root".to_string(),
            email: Some("root@examcoach.app".to_string()),
            token: "dev-token".to_string(),
        };

        seed_admin(&admin, &users, &identity, &clock).await.unwrap();

        let record = users.get(&UserId::new("root")).await.unwrap().unwrap();
        assert!(record.is_admin());
        let caller = identity.verify_id_token("dev-token").await.unwrap();
        assert_eq!(caller.uid, UserId::new("root"));
    }
}
