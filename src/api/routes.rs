//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::probe::{EnvSource, ProbeError, ProcessEnv, SecretProbe};

use super::pages;
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Where the probe reads `sb-env-secret` and `storage-env-secret` from
    pub env: Box<dyn EnvSource>,
}

impl AppState {
    /// State backed by the process environment.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            env: Box::new(ProcessEnv),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/probe", get(get_probe))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    tracing::info!("Probing secrets under {}", config.web_root.display());

    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Render the probe page.
async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let record = run_probe(&state).await?;
    Ok(Html(pages::render_index(&record)))
}

/// Probe result as JSON.
async fn get_probe(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DisplayRecord>, (StatusCode, String)> {
    run_probe(&state).await.map(Json)
}

async fn run_probe(state: &AppState) -> Result<DisplayRecord, (StatusCode, String)> {
    SecretProbe::new(&state.config.web_root)
        .with_env(&*state.env)
        .run()
        .await
        .map_err(probe_error_response)
}

/// Log the fault and hide the path and contents from the client.
fn probe_error_response(err: ProbeError) -> (StatusCode, String) {
    tracing::error!("Secret probe failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}
