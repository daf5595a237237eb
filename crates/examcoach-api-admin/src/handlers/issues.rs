//! Support-issue callable.
//!
//! POST /submitIssue - any signed-in user may file an issue. The store fires
//! the creation trigger, which assigns a fallback display id when needed.

use std::sync::Arc;

use axum::Extension;
use examcoach_admin::{AdminError, CallerIdentity, Clock, IssueStore, NewIssue};

use crate::error::ApiResult;
use crate::models::{Callable, CallableResponse, SubmitIssueRequest, SubmitIssueResponse};

/// Files a support issue.
pub async fn submit_issue_handler(
    caller: Option<Extension<CallerIdentity>>,
    Extension(issues): Extension<Arc<dyn IssueStore>>,
    Extension(clock): Extension<Arc<dyn Clock>>,
    payload: Callable,
) -> ApiResult<CallableResponse<SubmitIssueResponse>> {
    let Some(Extension(caller)) = caller else {
        return Err(AdminError::Unauthenticated.into());
    };
    let request: SubmitIssueRequest = payload.decode()?;

    let title = request.title.trim();
    if title.is_empty() {
        return Err(AdminError::invalid_argument("title", "title is required").into());
    }

    let issue = issues
        .create(
            NewIssue {
                title: title.to_string(),
                description: request.description,
                category: request.category,
                source_app: request.source_app,
                display_id: request.display_id.filter(|d| !d.trim().is_empty()),
                reporter_uid: Some(caller.uid.clone()),
            },
            clock.now(),
        )
        .await?;

    tracing::info!(
        issue_id = %issue.id,
        reporter_uid = %caller.uid,
        display_id = ?issue.display_id,
        "Support issue submitted"
    );

    Ok(CallableResponse::new(SubmitIssueResponse {
        id: issue.id.into_inner(),
        display_id: issue.display_id,
    }))
}
