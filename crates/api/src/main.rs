use std::net::SocketAddr;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postforge_api::config::AppConfig;
use postforge_api::router::build_app_router;
use postforge_api::state::{AppState, Backends};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // LOG_FORMAT=json switches to structured output for log shippers.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "postforge_api=debug,postforge_pipeline=debug,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = AppConfig::from_env();
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        generation_timeout_secs = config.workflow.generation_timeout_secs,
        contract = %config.workflow.response_contract.version,
        "Loaded configuration"
    );

    // --- Database ---
    let pool = postforge_db::create_pool(&config.backend.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    postforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    postforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- App state ---
    let backends = Backends::live(&pool, &config).expect("Failed to configure backends");
    let cancel = CancellationToken::new();
    let server_config = config.server.clone();
    let state = AppState::new(pool, config, backends, cancel);

    // Workflow milestones go to the log.
    let event_log_handle = tokio::spawn(log_events(state.event_bus.subscribe()));

    let app = build_app_router(state.clone(), &server_config);

    // --- Start server ---
    let addr = SocketAddr::new(
        server_config.host.parse().expect("Invalid HOST address"),
        server_config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        pending = state.background.pending(),
        "Server stopped accepting connections, cleaning up"
    );

    // Pending late writes and approval notifications are cancelled.
    let grace = Duration::from_secs(server_config.shutdown_timeout_secs);
    if tokio::time::timeout(grace, state.background.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("Background tasks did not finish within the shutdown timeout");
    }

    state.auth_context.close().await;
    event_log_handle.abort();

    tracing::info!("Graceful shutdown complete");
}

async fn log_events(mut rx: tokio::sync::broadcast::Receiver<postforge_events::PlatformEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match rx.recv().await {
            Ok(event) => tracing::info!(
                event_type = %event.event_type,
                entity_id = ?event.source_entity_id,
                actor = ?event.actor_user_id,
                "Event"
            ),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event log fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
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
