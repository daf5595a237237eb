//! Caller identity middleware.
//!
//! Resolves `Authorization: Bearer <id token>` through the identity provider
//! and inserts the resulting [`CallerIdentity`] into request extensions.
//! A request without the header passes through with no caller; handlers then
//! fail with `UNAUTHENTICATED`. A token the provider rejects is answered with
//! `UNAUTHENTICATED` here; a provider failure while verifying is `INTERNAL`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use examcoach_admin::{IdentityError, IdentityProvider};

use crate::error::ApiAdminError;

/// Middleware that establishes the caller identity.
///
/// Requires an `Extension<Arc<dyn IdentityProvider>>` layered outside it.
///
/// ```rust,ignore
/// let router = Router::new()
///     .route("/grantTester", post(grant_tester_handler))
///     .layer(middleware::from_fn(caller_identity_middleware))
///     .layer(Extension(identity));
/// ```
pub async fn caller_identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiAdminError> {
    let Some(token) = bearer_token(request.headers())? else {
        return Ok(next.run(request).await);
    };

    let identity = request
        .extensions()
        .get::<Arc<dyn IdentityProvider>>()
        .cloned()
        .ok_or_else(|| ApiAdminError::Internal("identity provider not configured".to_string()))?;

    let caller = identity
        .verify_id_token(&token)
        .await
        .map_err(|e| match e {
            IdentityError::InvalidToken => {
                tracing::warn!("Rejected unverifiable ID token");
                ApiAdminError::InvalidToken
            }
            other => ApiAdminError::Internal(format!("token verification failed: {other}")),
        })?;

    tracing::debug!(caller_uid = %caller.uid, "Caller authenticated");
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// The bearer token, `None` when no `Authorization` header is present.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiAdminError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| Some(t.to_string()))
        .ok_or_else(|| {
            tracing::warn!("Rejected malformed Authorization header");
            ApiAdminError::InvalidToken
        })
}
