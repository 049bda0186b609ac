use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caselog_api::config::ServerConfig;
use caselog_api::router::build_app_router;
use caselog_api::state::AppState;
use caselog_events::{EmailConfig, EmailDelivery, EventBus, Notifier};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caselog_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = caselog_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    caselog_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    caselog_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn the notifier (routes workflow events to best-effort emails).
    let email_delivery = match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, "Email delivery configured");
            Some(EmailDelivery::new(config))
        }
        None => {
            tracing::info!("SMTP not configured; notifications are log-only");
            None
        }
    };
    let notifier_cancel = CancellationToken::new();
    let notifier = Notifier::new(pool.clone(), email_delivery);
    let notifier_handle = tokio::spawn(notifier.run(event_bus.subscribe(), notifier_cancel.clone()));

    // --- App state / router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Caselog API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Drain the notifier after the server stops accepting requests.
    notifier_cancel.cancel();
    let _ = notifier_handle.await;
    tracing::info!("Shutdown complete");
}

/// Resolve when the process receives SIGINT (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Shutdown signal received");
}
