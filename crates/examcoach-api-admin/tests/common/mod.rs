//! Common test utilities for examcoach-api-admin integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use examcoach_admin::{
    Clock, FixedClock, InMemoryAuditStore, InMemoryIdentityProvider, InMemoryIssueStore,
    InMemoryStatsStore, InMemoryUserStore, Role, UserRecord, UserStore,
};
use examcoach_api_admin::{admin_router, AdminState};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const STUDENT_TOKEN: &str = "student-token";
pub const ADMIN_UID: &str = "admin-uid";
pub const STUDENT_UID: &str = "student-uid";

/// Router plus handles on its in-memory backends.
pub struct TestApp {
    pub router: Router,
    pub users: Arc<InMemoryUserStore>,
    pub audit: Arc<InMemoryAuditStore>,
    pub stats: Arc<InMemoryStatsStore>,
    pub issues: Arc<InMemoryIssueStore>,
    pub identity: Arc<InMemoryIdentityProvider>,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    /// App with one admin and one regular user, each holding a token.
    pub async fn new() -> Self {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        ));
        let users = Arc::new(InMemoryUserStore::new());
        let audit = Arc::new(InMemoryAuditStore::new());
        let stats = Arc::new(InMemoryStatsStore::new());
        let issues = Arc::new(InMemoryIssueStore::new());
        let identity = Arc::new(InMemoryIdentityProvider::new());

        let now = clock.now();
        for (uid, role, email, token) in [
            (ADMIN_UID, Role::Admin, "admin@examcoach.app", ADMIN_TOKEN),
            (STUDENT_UID, Role::User, "student@school.edu", STUDENT_TOKEN),
        ] {
            users
                .put(UserRecord::new(uid, now).with_role(role).with_email(email))
                .await
                .unwrap();
            identity.add_account(uid, Some(email.to_string())).await;
            identity.issue_token(token, uid).await;
        }

        let state = AdminState::new(
            users.clone(),
            audit.clone(),
            stats.clone(),
            issues.clone(),
            identity.clone(),
            clock.clone(),
        );

        Self {
            router: admin_router(state),
            users,
            audit,
            stats,
            issues,
            identity,
            clock,
        }
    }

    /// POST a callable body and return the status and decoded JSON.
    pub async fn call(
        &self,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.send(request).await
    }

    /// Send a raw request.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
