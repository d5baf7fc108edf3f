use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use innkeep_api::config::ServerConfig;
use innkeep_api::router::build_app_router;
use innkeep_api::state::AppState;
use innkeep_core::clock::SystemClock;
use innkeep_core::memory::MemoryStore;
use innkeep_core::store::BookingStore;
use innkeep_events::{EmailConfig, EmailDelivery, LogSink, NotificationQueue, NotificationSink};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "innkeep_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let (store, pool) = match &config.database_url {
        Some(database_url) => {
            let pool = innkeep_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            innkeep_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            innkeep_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            let store: Arc<dyn BookingStore> = Arc::new(innkeep_db::PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (single instance only)");
            let store: Arc<dyn BookingStore> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    // --- Notifications ---
    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    match EmailConfig::from_env().map(EmailDelivery::new) {
        Some(Ok(mailer)) => {
            tracing::info!("SMTP email delivery enabled");
            sinks.push(Arc::new(mailer));
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "SMTP misconfigured, booking emails disabled");
        }
        None => tracing::info!("SMTP_HOST not set, booking notices are only logged"),
    }
    let (queue, notification_worker) =
        NotificationQueue::start(config.notification_queue_capacity, sinks);

    // --- App ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);

    let state = AppState::new(config, store, Arc::new(queue), Arc::new(SystemClock), pool);
    let app = build_app_router(state);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    // The router (and with it the last queue handle) is gone, so the worker
    // drains what is left and exits.
    tracing::info!("Server stopped accepting connections, draining notifications");
    if tokio::time::timeout(shutdown_timeout, notification_worker)
        .await
        .is_err()
    {
        tracing::warn!("Notification worker did not drain before the shutdown timeout");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
