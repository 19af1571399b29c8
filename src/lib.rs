//! plotd: chart rendering over HTTP.
//!
//! Clients POST a declarative chart descriptor (or a curve family plus
//! parameters) and get back a PNG rendered on a request-local canvas,
//! base64-encoded into a `data:` URL. A flat login layer gates two demo
//! panels; everything else is stateless.

pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod session;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

/// Build the service router. Split out from [`start_server`] so tests can
/// drive it without binding a socket.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::home))
        .route("/health", get(handlers::health::health))
        .route("/login", post(handlers::auth::login))
        .route("/admin", get(handlers::auth::admin_panel))
        .route("/user", get(handlers::auth::user_panel))
        .route("/generate-image", post(handlers::generate::generate_image))
        .route("/generate-plot", post(handlers::generate::generate_plot))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.host(), config.port());
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
