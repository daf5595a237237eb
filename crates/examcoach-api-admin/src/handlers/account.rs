//! Account callables.
//!
//! POST /disableUser, /adminUpdateUserEmail

use std::sync::Arc;

use axum::Extension;
use examcoach_admin::{AccountService, CallerIdentity, UserStore};

use crate::error::ApiResult;
use crate::handlers::decode_admin_payload;
use crate::models::{
    Callable, CallableResponse, DisableUserRequest, SuccessResponse, UpdateEmailRequest,
};

/// Disables or re-enables an account.
pub async fn disable_user_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(service): Extension<Arc<AccountService>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<SuccessResponse>> {
    let caller = caller.map(|Extension(c)| c);
    let request: DisableUserRequest =
        decode_admin_payload(payload, users.as_ref(), caller.as_ref()).await?;
    service
        .set_disabled(caller.as_ref(), &request.target_uid, request.disabled)
        .await?;
    Ok(CallableResponse::new(SuccessResponse::ok()))
}

/// Changes an account's sign-in email.
pub async fn update_email_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(service): Extension<Arc<AccountService>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    payload: Callable,
) -> ApiResult<CallableResponse<SuccessResponse>> {
    let caller = caller.map(|Extension(c)| c);
    let request: UpdateEmailRequest =
        decode_admin_payload(payload, users.as_ref(), caller.as_ref()).await?;
    service
        .update_email(caller.as_ref(), &request.target_uid, &request.new_email)
        .await?;
    Ok(CallableResponse::new(SuccessResponse::ok()))
}
