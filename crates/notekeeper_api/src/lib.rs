//! HTTP boundary for Notekeeper.
//!
//! # Responsibility
//! - Map REST requests onto `NoteService` calls.
//! - Map typed service errors onto HTTP status codes and error bodies.
//!
//! # Invariants
//! - Handlers never touch SQLite directly; all note access goes through
//!   the shared service.
//! - Every error response uses the `{detail, error_code, timestamp}` body.

pub mod dto;
pub mod error;
mod handlers;
pub mod middleware;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use log::{error, info};
use notekeeper_core::ServerConfig;
use tokio::net::TcpListener;

/// Builds the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let notes = Router::new()
        .route(
            "/notes",
            get(handlers::list_notes).post(handlers::create_note),
        )
        .route(
            "/notes/{id}",
            get(handlers::get_note)
                .put(handlers::update_note)
                .delete(handlers::delete_note),
        );

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health));

    let app = if config.api_prefix.is_empty() {
        app.merge(notes)
    } else {
        app.nest(&config.api_prefix, notes)
    };

    middleware::apply(
        app.fallback(handlers::fallback).with_state(state),
        &config.cors_origins,
    )
}

/// Binds `config.bind` and serves until Ctrl-C.
pub async fn serve(app: Router, config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind).await?;
    let local_addr = listener.local_addr()?;
    info!(
        "event=server_start module=api status=ok addr={} prefix={}",
        local_addr, config.api_prefix
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=api status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=api status=error error={err}");
    }
}
