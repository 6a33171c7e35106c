//! Axum HTTP surface.
//!
//! ```text
//! GET  /              → 307 /tarot          (basic auth)
//! GET  /tarot         → draw page           (basic auth)
//! POST /chat          → text/event-stream   (basic auth)
//! GET  /tarot/draw    → JSON spread
//! GET  /favicon.ico   → 204
//! ```
//!
//! Handlers are thin: the draw engine and the completion relay do the work.
//! The listener is wired to a [`CancellationToken`] for graceful shutdown.

mod api;
pub mod auth;
mod ui;

use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::relay::CompletionRelay;
use crate::tarot::DrawEngine;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone; all fields are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DrawEngine>,
    /// `None` when no completion provider is configured.
    pub relay: Option<CompletionRelay>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(engine: DrawEngine, relay: Option<CompletionRelay>, auth: AuthConfig) -> Self {
        Self { engine: Arc::new(engine), relay, auth: Arc::new(auth) }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/",      get(ui::root))
        .route("/tarot", get(ui::tarot_page))
        .route("/chat",  post(api::chat))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .merge(protected)
        .route("/tarot/draw",  get(api::tarot_draw))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Bind `bind_addr` and serve `router` until `shutdown` is cancelled.
pub async fn serve(
    bind_addr: &str,
    router: Router,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    let local = listener
        .local_addr()
        .map_err(|e| AppError::Server(format!("no local address: {e}")))?;
    info!(bind = %local, "http server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("http server error: {e}")))?;

    info!("http server shut down");
    Ok(())
}
