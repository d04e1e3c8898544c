//! Waitmail Bot - waitlist welcome-email service.
//!
//! One process runs both halves of the system:
//! - An axum web server receiving Slack event webhooks and serving status pages
//! - A background delivery worker draining the persistent delayed-delivery queue
//!
//! Pending deliveries are snapshotted to a JSON file after every queue
//! mutation and reloaded at startup, so scheduled emails survive restarts.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use waitmail::mailer::Mailer;
use waitmail::web::{health, home, ping, slack_events, AppState};
use waitmail::{worker, Config, DeliveryQueue, MailgunMailer, QueueStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("waitmail_starting");

    // Load configuration from environment
    let config = Arc::new(Config::from_env());
    info!(
        port = config.port,
        queue_file = %config.queue_file.display(),
        poll_interval_secs = config.poll_interval.as_secs(),
        retry_backoff_secs = config.retry_backoff.num_seconds(),
        initial_delay_secs = config.initial_delay.num_seconds(),
        slack_signing_configured = config.slack_signing_secret.is_some(),
        slack_token_configured = config.slack_verification_token.is_some(),
        mailgun_configured = config.mailgun_api_key.is_some() && config.mailgun_domain.is_some(),
        "config_loaded"
    );

    // Load any pending deliveries from a previous run
    let store = QueueStore::new(&config.queue_file);
    let loaded = store.load().await;
    info!(entry_count = loaded.len(), "queue_restored");

    let queue = Arc::new(DeliveryQueue::new(store, loaded, config.retry_backoff));

    // Shared HTTP client for outbound mail
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;
    let mailer: Arc<dyn Mailer> = Arc::new(MailgunMailer::new(&config, client));

    // Start the delivery worker
    tokio::spawn(worker::run(
        Arc::clone(&queue),
        mailer,
        config.poll_interval,
        config.cycle_cooldown,
    ));

    // Create application state
    let state = AppState::new(Arc::clone(&config), Arc::clone(&queue));

    // Build the router
    let app = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/ping", get(ping))
        .route("/slack/events", post(slack_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // One last snapshot so nothing enqueued mid-shutdown is lost
    if let Err(e) = queue.persist().await {
        error!(error = %e, "final_persist_failed");
    }

    info!("waitmail_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("waitmail_shutting_down");
}
