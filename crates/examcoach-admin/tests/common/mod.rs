//! Common test utilities for examcoach-admin integration tests.
//!
//! All tests use in-memory stores and a [`FixedClock`] so expiry arithmetic is
//! exact.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, TimeZone, Utc};
use examcoach_admin::{
    AccountService, BillingSource, BillingStatus, CallerIdentity, FixedClock,
    InMemoryAuditStore, InMemoryIdentityProvider, InMemoryIssueStore, InMemoryStatsStore,
    InMemoryUserStore, IssueIdAssigner, Role, StatsRecorder, TesterExpirationJob, TesterService,
    UserRecord, UserStore,
};
use examcoach_core::UserId;

static INIT: Once = Once::new();

/// Initialize logging for tests (once, only when `RUST_LOG` is set).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// Uid of the admin seeded into every context.
pub const ADMIN_UID: &str = "admin-uid";

/// Uid of the regular user seeded into every context.
pub const STUDENT_UID: &str = "student-uid";

/// All in-memory stores for test isolation.
#[derive(Clone)]
pub struct TestStores {
    pub users: Arc<InMemoryUserStore>,
    pub audit: Arc<InMemoryAuditStore>,
    pub stats: Arc<InMemoryStatsStore>,
    pub issues: Arc<InMemoryIssueStore>,
    pub identity: Arc<InMemoryIdentityProvider>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            audit: Arc::new(InMemoryAuditStore::new()),
            stats: Arc::new(InMemoryStatsStore::new()),
            issues: Arc::new(InMemoryIssueStore::new()),
            identity: Arc::new(InMemoryIdentityProvider::new()),
        }
    }
}

/// Services and jobs wired to the stores.
pub struct TestServices {
    pub tester: TesterService,
    pub account: AccountService,
    pub expiration_job: TesterExpirationJob,
    pub assigner: IssueIdAssigner,
}

impl TestServices {
    pub fn new(stores: &TestStores, clock: Arc<FixedClock>) -> Self {
        let stats = StatsRecorder::new(stores.stats.clone(), clock.clone());
        Self {
            tester: TesterService::new(
                stores.users.clone(),
                stores.audit.clone(),
                stats.clone(),
                clock.clone(),
            ),
            account: AccountService::new(
                stores.users.clone(),
                stores.audit.clone(),
                stores.identity.clone(),
                stats,
                clock.clone(),
            ),
            expiration_job: TesterExpirationJob::new(
                stores.users.clone(),
                stores.audit.clone(),
                clock.clone(),
            ),
            assigner: IssueIdAssigner::new(stores.issues.clone(), clock),
        }
    }
}

/// Test context containing stores, services and seeded callers.
pub struct TestContext {
    pub stores: TestStores,
    pub services: TestServices,
    pub clock: Arc<FixedClock>,
    pub admin: CallerIdentity,
    pub student: CallerIdentity,
}

impl TestContext {
    /// Context with one admin and one regular user, clock frozen at 2025-03-01.
    pub async fn new() -> Self {
        init_test_logging();
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let stores = TestStores::new();
        let services = TestServices::new(&stores, clock.clone());

        let ctx = Self {
            stores,
            services,
            clock,
            admin: CallerIdentity::new(ADMIN_UID),
            student: CallerIdentity::new(STUDENT_UID),
        };
        ctx.seed_user(
            UserRecord::new(ADMIN_UID, ctx.now()).with_role(Role::Admin),
        )
        .await;
        ctx.seed_user(
            UserRecord::new(STUDENT_UID, ctx.now()).with_email("student@school.edu"),
        )
        .await;
        ctx
    }

    pub fn now(&self) -> DateTime<Utc> {
        use examcoach_admin::Clock;
        self.clock.now()
    }

    /// Put a record in the user store and register its identity account.
    pub async fn seed_user(&self, record: UserRecord) {
        self.stores
            .identity
            .add_account(record.uid.clone(), record.email.clone())
            .await;
        self.stores.users.put(record).await.expect("seed user");
    }

    pub async fn user(&self, uid: &str) -> UserRecord {
        self.stores
            .users
            .get(&UserId::new(uid))
            .await
            .expect("store read")
            .expect("user exists")
    }
}

/// 2025-03-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// A record carrying an active or lapsed tester override.
pub fn tester_record(uid: &str, expires_at: DateTime<Utc>) -> UserRecord {
    let mut user = UserRecord::new(uid, expires_at - Duration::days(14))
        .with_email(format!("{uid}@school.edu"));
    user.tester_override = true;
    user.tester_expires_at = Some(expires_at);
    user.is_pro = true;
    user.billing_status = BillingStatus::Tester;
    user.billing_source = Some(BillingSource::Manual);
    user
}

/// A tester whose billing is also verified by Stripe.
pub fn stripe_tester_record(uid: &str, expires_at: DateTime<Utc>) -> UserRecord {
    let mut user = tester_record(uid, expires_at);
    user.billing_status = BillingStatus::Active;
    user.billing_source = Some(BillingSource::Stripe);
    user
}
