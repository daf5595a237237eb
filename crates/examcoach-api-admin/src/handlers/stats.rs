//! Stats callable.
//!
//! POST /getAdminStats

use std::sync::Arc;

use axum::Extension;
use examcoach_admin::services::require_admin;
use examcoach_admin::{AdminStats, CallerIdentity, StatsRecorder, UserStore};

use crate::error::ApiResult;
use crate::models::CallableResponse;

/// Returns the aggregate admin counters.
pub async fn get_admin_stats_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(users): Extension<Arc<dyn UserStore>>,
    Extension(stats): Extension<StatsRecorder>,
) -> ApiResult<CallableResponse<AdminStats>> {
    let caller = caller.map(|Extension(c)| c);
    require_admin(users.as_ref(), caller.as_ref()).await?;
    Ok(CallableResponse::new(stats.snapshot().await?))
}
