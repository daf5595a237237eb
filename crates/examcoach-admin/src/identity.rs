//! Identity provider port.
//!
//! The hosted identity provider owns credentials, the account-level disabled
//! flag and the canonical email. [`IdentityProvider`] is the narrow surface the
//! admin functions need; [`InMemoryIdentityProvider`] backs tests and the
//! development server.

use std::collections::HashMap;
use std::sync::Arc;

use examcoach_core::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::IdentityError;
use crate::types::CallerIdentity;

/// An account as seen by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAccount {
    /// Account uid.
    pub uid: UserId,
    /// Sign-in email.
    pub email: Option<String>,
    /// Whether sign-in is blocked.
    pub disabled: bool,
}

/// Operations the admin functions perform against the identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer ID token and return the caller it belongs to.
    async fn verify_id_token(&self, token: &str) -> Result<CallerIdentity, IdentityError>;

    /// Set the account-level disabled flag.
    async fn set_disabled(&self, uid: &UserId, disabled: bool) -> Result<(), IdentityError>;

    /// Change the sign-in email.
    async fn update_email(&self, uid: &UserId, email: &str) -> Result<(), IdentityError>;

    /// Look up an account.
    async fn get_account(&self, uid: &UserId) -> Result<Option<IdentityAccount>, IdentityError>;
}

/// In-memory identity provider.
///
/// Tokens are opaque strings registered with [`InMemoryIdentityProvider::issue_token`].
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: Arc<RwLock<HashMap<UserId, IdentityAccount>>>,
    tokens: Arc<RwLock<HashMap<String, UserId>>>,
    fail_with: Arc<RwLock<Option<IdentityError>>>,
    fail_verification_with: Arc<RwLock<Option<IdentityError>>>,
}

impl InMemoryIdentityProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    pub async fn add_account(&self, uid: impl Into<UserId>, email: Option<String>) {
        let uid = uid.into();
        self.accounts.write().await.insert(
            uid.clone(),
            IdentityAccount {
                uid,
                email,
                disabled: false,
            },
        );
    }

    /// Map a bearer token to an account uid.
    pub async fn issue_token(&self, token: impl Into<String>, uid: impl Into<UserId>) {
        self.tokens.write().await.insert(token.into(), uid.into());
    }

    /// Make every mutating call fail with `err` until cleared (for testing).
    pub async fn fail_mutations_with(&self, err: Option<IdentityError>) {
        *self.fail_with.write().await = err;
    }

    /// Make token verification fail with `err` until cleared (for testing).
    pub async fn fail_verification_with(&self, err: Option<IdentityError>) {
        *self.fail_verification_with.write().await = err;
    }

    async fn injected_failure(&self) -> Result<(), IdentityError> {
        match self.fail_with.read().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn verify_id_token(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        if let Some(err) = self.fail_verification_with.read().await.clone() {
            return Err(err);
        }
        self.tokens
            .read()
            .await
            .get(token)
            .map(|uid| CallerIdentity::new(uid.clone()))
            .ok_or(IdentityError::InvalidToken)
    }

    async fn set_disabled(&self, uid: &UserId, disabled: bool) -> Result<(), IdentityError> {
        self.injected_failure().await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::UserNotFound(uid.clone()))?;
        account.disabled = disabled;
        Ok(())
    }

    async fn update_email(&self, uid: &UserId, email: &str) -> Result<(), IdentityError> {
        self.injected_failure().await?;
        let mut accounts = self.accounts.write().await;
        let taken = accounts
            .values()
            .any(|a| &a.uid != uid && a.email.as_deref() == Some(email));
        if taken {
            return Err(IdentityError::EmailAlreadyExists(email.to_string()));
        }
        let account = accounts
            .get_mut(uid)
            .ok_or_else(|| IdentityError::UserNotFound(uid.clone()))?;
        account.email = Some(email.to_string());
        Ok(())
    }

    async fn get_account(&self, uid: &UserId) -> Result<Option<IdentityAccount>, IdentityError> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_token() {
        let idp = InMemoryIdentityProvider::new();
        idp.issue_token("tok-1", "u1").await;

        let caller = idp.verify_id_token("tok-1").await.unwrap();
        assert_eq!(caller.uid.as_str(), "u1");
        assert_eq!(
            idp.verify_id_token("forged").await.unwrap_err(),
            IdentityError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_set_disabled_unknown_account() {
        let idp = InMemoryIdentityProvider::new();
        let err = idp
            .set_disabled(&UserId::new("ghost"), true)
            .await
            .unwrap_err();
        assert_eq!(err, IdentityError::UserNotFound(UserId::new("ghost")));
    }

    #[tokio::test]
    async fn test_update_email_rejects_duplicate() {
        let idp = InMemoryIdentityProvider::new();
        idp.add_account("u1", Some("a@x.io".to_string())).await;
        idp.add_account("u2", Some("b@x.io".to_string())).await;

        let err = idp
            .update_email(&UserId::new("u2"), "a@x.io")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::EmailAlreadyExists(_)));

        idp.update_email(&UserId::new("u2"), "c@x.io").await.unwrap();
        let account = idp.get_account(&UserId::new("u2")).await.unwrap().unwrap();
        assert_eq!(account.email.as_deref(), Some("c@x.io"));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let idp = InMemoryIdentityProvider::new();
        idp.add_account("u1", None).await;
        idp.fail_mutations_with(Some(IdentityError::Unavailable("down".to_string())))
            .await;

        assert!(idp.set_disabled(&UserId::new("u1"), true).await.is_err());
        let account = idp.get_account(&UserId::new("u1")).await.unwrap().unwrap();
        assert!(!account.disabled);
    }
}
