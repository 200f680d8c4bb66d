use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use faceframe_cloud::http_image::HttpImageSource;
use faceframe_cloud::runpod::{RunPodClient, RunPodConfig};
use faceframe_cloud::storage::{StorageConfig, SupabaseStorage};
use faceframe_core::config::{frame_layout_from_env, require_env, PollingConfig};
use faceframe_db::PgSessionStore;
use faceframe_pipeline::{Compositor, FileImageSource, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faceframe_api::config::ServerConfig;
use faceframe_api::router::build_app_router;
use faceframe_api::state::AppState;

/// Timeout for storage, compute, and result-image requests.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "faceframe_api=debug,faceframe_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    let polling = PollingConfig::from_env()?;
    let layout = frame_layout_from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        interval_ms = polling.interval.as_millis() as u64,
        max_attempts = polling.max_attempts,
        ?layout,
        "Loaded pipeline configuration",
    );
    if polling.worst_case() >= Duration::from_secs(config.request_timeout_secs) {
        tracing::warn!(
            worst_case_secs = polling.worst_case().as_secs(),
            request_timeout_secs = config.request_timeout_secs,
            "Request timeout is shorter than the polling budget",
        );
    }

    // --- Database ---
    let database_url = require_env("DATABASE_URL")?;
    let pool = faceframe_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    faceframe_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    faceframe_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- Collaborators ---
    let http = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let storage = Arc::new(SupabaseStorage::with_client(
        http.clone(),
        StorageConfig::from_env()?,
    ));
    let jobs = Arc::new(RunPodClient::with_client(
        http.clone(),
        RunPodConfig::from_env()?,
    ));
    let compositor = Compositor::new(
        Arc::new(HttpImageSource::with_client(http)),
        Arc::new(FileImageSource::new()),
        config.frame_image_path.clone(),
        layout,
    );
    let pipeline = Pipeline::new(
        storage.clone(),
        Arc::new(PgSessionStore::new(pool.clone())),
        jobs,
        compositor,
        polling,
    );

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(pipeline),
        storage,
    };
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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
