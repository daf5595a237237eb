//! Admin callable router configuration.
//!
//! Configures one POST route per callable:
//! - POST /grantTester - Grant a tester override
//! - POST /revokeTester - Revoke a tester override
//! - POST /extendTester - Extend a tester override
//! - POST /disableUser - Disable or re-enable an account
//! - POST /adminUpdateUserEmail - Change an account email
//! - POST /listAuditLog - Read the audit trail
//! - POST /getAdminStats - Read aggregate counters
//! - POST /submitIssue - File a support issue
//!
//! And GET /healthz for liveness checks.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use examcoach_admin::{
    AccountService, AuditStore, Clock, IdentityProvider, IssueStore, StatsRecorder, StatsStore,
    TesterService, UserStore,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    disable_user_handler, extend_tester_handler, get_admin_stats_handler, grant_tester_handler,
    list_audit_log_handler, revoke_tester_handler, submit_issue_handler, update_email_handler,
};
use crate::middleware::caller_identity_middleware;

/// Application state for the admin callables.
#[derive(Clone)]
pub struct AdminState {
    /// User record store.
    pub users: Arc<dyn UserStore>,
    /// Audit record store.
    pub audit_store: Arc<dyn AuditStore>,
    /// Support-issue store.
    pub issues: Arc<dyn IssueStore>,
    /// Identity provider for token verification and account writes.
    pub identity: Arc<dyn IdentityProvider>,
    /// Best-effort counters.
    pub stats: StatsRecorder,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Tester entitlement commands.
    pub tester_service: Arc<TesterService>,
    /// Account commands.
    pub account_service: Arc<AccountService>,
}

impl AdminState {
    /// Create the state and its services.
    pub fn new(
        users: Arc<dyn UserStore>,
        audit_store: Arc<dyn AuditStore>,
        stats_store: Arc<dyn StatsStore>,
        issues: Arc<dyn IssueStore>,
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stats = StatsRecorder::new(stats_store, clock.clone());
        let tester_service = Arc::new(TesterService::new(
            users.clone(),
            audit_store.clone(),
            stats.clone(),
            clock.clone(),
        ));
        let account_service = Arc::new(AccountService::new(
            users.clone(),
            audit_store.clone(),
            identity.clone(),
            stats.clone(),
            clock.clone(),
        ));
        Self {
            users,
            audit_store,
            issues,
            identity,
            stats,
            clock,
            tester_service,
            account_service,
        }
    }
}

/// Create the admin router with all callables.
///
/// Callers are identified by [`caller_identity_middleware`]; each command
/// enforces the admin role itself.
pub fn admin_router(state: AdminState) -> Router {
    let callables = Router::new()
        .route("/grantTester", post(grant_tester_handler))
        .route("/revokeTester", post(revoke_tester_handler))
        .route("/extendTester", post(extend_tester_handler))
        .route("/disableUser", post(disable_user_handler))
        .route("/adminUpdateUserEmail", post(update_email_handler))
        .route("/listAuditLog", post(list_audit_log_handler))
        .route("/getAdminStats", post(get_admin_stats_handler))
        .route("/submitIssue", post(submit_issue_handler))
        .layer(middleware::from_fn(caller_identity_middleware))
        .layer(Extension(state.tester_service))
        .layer(Extension(state.account_service))
        .layer(Extension(state.users))
        .layer(Extension(state.audit_store))
        .layer(Extension(state.issues))
        .layer(Extension(state.identity))
        .layer(Extension(state.stats))
        .layer(Extension(state.clock));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(callables)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}
