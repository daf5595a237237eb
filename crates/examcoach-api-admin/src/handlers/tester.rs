//! Tester entitlement callables.
//!
//! POST /grantTester, /revokeTester, /extendTester

use std::sync::Arc;

use axum::Extension;
use examcoach_admin::{CallerIdentity, TesterService, UserStore};

use crate::error::ApiResult;
use crate::handlers::decode_admin_payload;
use crate::models::{
    Callable, CallableResponse, ExtendTesterResponse, SuccessResponse, TargetUserRequest,
};

/// Grants a 14-day tester override.
pub async fn grant_tester_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(service): Extension<Arc<TesterService>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<SuccessResponse>> {
    let caller = caller.map(|Extension(c)| c);
    let request: TargetUserRequest =
        decode_admin_payload(payload, users.as_ref(), caller.as_ref()).await?;
    service.grant(caller.as_ref(), &request.target_uid).await?;
    Ok(CallableResponse::new(SuccessResponse::ok()))
}

/// Revokes a tester override immediately.
pub async fn revoke_tester_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(service): Extension<Arc<TesterService>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<SuccessResponse>> {
    let caller = caller.map(|Extension(c)| c);
    let request: TargetUserRequest =
        decode_admin_payload(payload, users.as_ref(), caller.as_ref()).await?;
    service.revoke(caller.as_ref(), &request.target_uid).await?;
    Ok(CallableResponse::new(SuccessResponse::ok()))
}

/// Adds seven days to the current tester expiry.
pub async fn extend_tester_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(service): Extension<Arc<TesterService>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<ExtendTesterResponse>> {
    let caller = caller.map(|Extension(c)| c);
    let request: TargetUserRequest =
        decode_admin_payload(payload, users.as_ref(), caller.as_ref()).await?;
    let new_expire = service.extend(caller.as_ref(), &request.target_uid).await?;
    Ok(CallableResponse::new(ExtendTesterResponse {
        success: true,
        new_expire,
    }))
}
