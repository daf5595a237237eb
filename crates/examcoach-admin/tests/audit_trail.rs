//! Integration tests for the admin audit trail.
//!
//! Every successful command appends exactly one record; failed commands
//! append none.

mod common;

use chrono::Duration;
use examcoach_admin::{AdminAuditAction, AuditEventFilter, AuditStore, IdentityError};
use examcoach_core::UserId;
use serde_json::json;

use common::{tester_record, TestContext, ADMIN_UID, STUDENT_UID};

#[tokio::test]
async fn test_each_successful_command_writes_one_record() {
    let ctx = TestContext::new().await;
    let admin = Some(&ctx.admin);
    let svc = &ctx.services;

    svc.tester.grant(admin, STUDENT_UID).await.unwrap();
    assert_eq!(ctx.stores.audit.count().await, 1);
    svc.tester.extend(admin, STUDENT_UID).await.unwrap();
    assert_eq!(ctx.stores.audit.count().await, 2);
    svc.tester.revoke(admin, STUDENT_UID).await.unwrap();
    assert_eq!(ctx.stores.audit.count().await, 3);
    svc.account
        .set_disabled(admin, STUDENT_UID, Some(true))
        .await
        .unwrap();
    assert_eq!(ctx.stores.audit.count().await, 4);
    svc.account
        .set_disabled(admin, STUDENT_UID, Some(false))
        .await
        .unwrap();
    assert_eq!(ctx.stores.audit.count().await, 5);
    svc.account
        .update_email(admin, STUDENT_UID, "renamed@school.edu")
        .await
        .unwrap();
    assert_eq!(ctx.stores.audit.count().await, 6);

    let actions: Vec<_> = ctx
        .stores
        .audit
        .get_all()
        .await
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            AdminAuditAction::GrantTester,
            AdminAuditAction::ExtendTester,
            AdminAuditAction::RevokeTester,
            AdminAuditAction::DisableUser,
            AdminAuditAction::EnableUser,
            AdminAuditAction::UpdateEmail,
        ]
    );
    assert!(ctx
        .stores
        .audit
        .get_all()
        .await
        .iter()
        .all(|e| e.admin_uid.as_str() == ADMIN_UID && e.target_user_id.as_str() == STUDENT_UID));
}

#[tokio::test]
async fn test_failed_commands_write_nothing() {
    let ctx = TestContext::new().await;
    let admin = Some(&ctx.admin);
    let svc = &ctx.services;

    assert!(svc.tester.grant(Some(&ctx.student), STUDENT_UID).await.is_err());
    assert!(svc.tester.extend(admin, STUDENT_UID).await.is_err());
    assert!(svc.tester.revoke(admin, "ghost").await.is_err());
    assert!(svc
        .account
        .update_email(admin, STUDENT_UID, "bad address")
        .await
        .is_err());

    ctx.stores
        .identity
        .fail_mutations_with(Some(IdentityError::Unavailable("503".to_string())))
        .await;
    assert!(svc
        .account
        .set_disabled(admin, STUDENT_UID, Some(true))
        .await
        .is_err());

    assert_eq!(ctx.stores.audit.count().await, 0);
}

#[tokio::test]
async fn test_grant_record_carries_state_snapshots() {
    let ctx = TestContext::new().await;
    ctx.services
        .tester
        .grant(Some(&ctx.admin), STUDENT_UID)
        .await
        .unwrap();

    let event = ctx.stores.audit.get_all().await.remove(0);
    assert_eq!(event.target_email.as_deref(), Some("student@school.edu"));
    assert_eq!(
        event.prev_state,
        Some(json!({ "testerOverride": false, "isPro": false }))
    );
    let new_state = event.new_state.unwrap();
    assert_eq!(new_state["testerOverride"], true);
    assert_eq!(new_state["isPro"], true);
    assert!(new_state["testerExpiresAt"].is_string());
}

#[tokio::test]
async fn test_extend_record_carries_days_added() {
    let ctx = TestContext::new().await;
    ctx.seed_user(tester_record("tester", ctx.now() + Duration::days(2)))
        .await;
    ctx.services
        .tester
        .extend(Some(&ctx.admin), "tester")
        .await
        .unwrap();

    let event = ctx.stores.audit.get_all().await.remove(0);
    assert_eq!(event.metadata, Some(json!({ "daysAdded": 7 })));
}

#[tokio::test]
async fn test_query_by_target_newest_first() {
    let ctx = TestContext::new().await;
    ctx.seed_user(tester_record("other", ctx.now() + Duration::days(2)))
        .await;
    let admin = Some(&ctx.admin);
    ctx.services.tester.grant(admin, STUDENT_UID).await.unwrap();
    ctx.services.tester.extend(admin, "other").await.unwrap();
    ctx.services.tester.revoke(admin, STUDENT_UID).await.unwrap();

    let events = ctx
        .stores
        .audit
        .query_events(AuditEventFilter {
            target_user_id: Some(UserId::new(STUDENT_UID)),
            ..Default::default()
        })
        .await
        .unwrap();

    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![AdminAuditAction::RevokeTester, AdminAuditAction::GrantTester]
    );
}
