//! Server initialization and routing
//!
//! - Router configuration with all API endpoints
//! - Middleware stack (auth, logging, compression, etc.)
//! - Prometheus recorder installation
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::metrics::{install_recorder, PrometheusPipelineMetrics};
use crate::middleware::{api_key_auth, log_requests, request_id};
use crate::routes::{api_info, not_found};
use crate::routes::{health, leaders, support, triage};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// Routes are divided into:
/// - Public routes: everything the mobile app calls, plus health and metrics
/// - Admin routes: `/truncate-channel` (API key required)
///
/// Middleware stack, outermost first:
/// 1. Tracing
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
/// 7. Body limit
/// 8. API key authentication (admin routes only)
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/classify-image", post(triage::classify_image))
        .route("/token/{userId}", get(support::issue_token))
        .route("/leaders", get(leaders::find_leaders));

    let admin_routes = Router::new()
        .route("/truncate-channel", post(support::truncate_channel))
        .layer(from_fn_with_state(state.clone(), api_key_auth));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Astra HTTP server
///
/// Blocks until the server is shut down via SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
/// Emitted after the subscriber is installed so the warning is not lost.
fn warn_on_unprotected_admin(config: &ServerConfig) {
    if config.api_keys.is_empty() {
        tracing::warn!("no admin API keys configured; admin routes will reject every request");
    }
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    warn_on_unprotected_admin(&config);

    let mut state = ServerState::new(config.clone())?;

    if config.metrics_enabled {
        match install_recorder() {
            Ok(handle) => {
                astra::set_pipeline_metrics(Some(Arc::new(PrometheusPipelineMetrics)));
                state = state.with_metrics(handle);
            }
            Err(err) => tracing::warn!(error = %err, "metrics_recorder_unavailable"),
        }
    }

    let app = build_router(Arc::new(state.clone()));
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        %addr,
        admin_keys = config.api_keys.len(),
        timeout_secs = config.timeout_secs,
        max_body_size_mb = config.max_body_size_mb,
        rate_limit_per_minute = config.rate_limit_per_minute,
        cors = config.enable_cors,
        metrics = state.metrics.is_some(),
        chat = state.chat.is_some(),
        leaders = state.leaders.is_some(),
        "server_starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server_stopped");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
