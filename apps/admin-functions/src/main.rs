//! Exam Coach admin functions server.
//!
//! Serves the admin callables over HTTP, runs the tester expiration sweeper on
//! a fixed schedule and drives the issue display-id trigger.

mod bootstrap;
mod config;
mod logging;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use config::Config;
use examcoach_admin::{
    Clock, InMemoryAuditStore, InMemoryIdentityProvider, InMemoryIssueStore, InMemoryStatsStore,
    InMemoryUserStore, IssueCreatedConsumer, IssueEventPublisher, IssueIdAssigner, SystemClock,
    TesterExpirationJob,
};
use examcoach_api_admin::{admin_router, AdminState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.log_filter);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        sweep_interval_secs = config.sweep_interval_secs,
        "Starting Exam Coach admin functions"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let users = Arc::new(InMemoryUserStore::new());
    let audit_store = Arc::new(InMemoryAuditStore::new());
    let stats_store = Arc::new(InMemoryStatsStore::new());
    let identity = Arc::new(InMemoryIdentityProvider::new());

    let (publisher, issue_events) = IssueEventPublisher::new(config.issue_event_capacity);
    let issues = Arc::new(InMemoryIssueStore::with_publisher(publisher));

    if let Some(admin) = &config.bootstrap_admin {
        if let Err(e) =
            bootstrap::seed_admin(admin, users.as_ref(), identity.as_ref(), clock.as_ref()).await
        {
            eprintln!("FATAL: Admin bootstrap failed: {e}");
            std::process::exit(1);
        }
    }

    let shutdown = CancellationToken::new();

    // Tester expiration sweeper
    let sweeper = {
        let job = TesterExpirationJob::new(users.clone(), audit_store.clone(), clock.clone());
        let interval = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(scheduler::run_sweeper(job, interval, shutdown.clone()))
    };

    // Issue display-id trigger
    let consumer = {
        let assigner = Arc::new(IssueIdAssigner::new(issues.clone(), clock.clone()));
        let consumer = IssueCreatedConsumer::new(assigner, issue_events);
        tokio::spawn(consumer.run(shutdown.clone()))
    };

    let state = AdminState::new(
        users,
        audit_store,
        stats_store,
        issues,
        identity,
        clock,
    );
    let app = admin_router(state).layer(cors_layer(&config.cors_origins));

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    // The signal handler cancels the token; make sure background tasks stop
    // on server errors too.
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("Sweeper task ended abnormally: {e}");
    }
    if let Err(e) = consumer.await {
        tracing::warn!("Issue consumer task ended abnormally: {e}");
    }

    info!("Server shutdown complete");
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutdown.cancel();
}
