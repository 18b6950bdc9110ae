//! A small URL shortener.
//!
//! `POST /` stores a URL under a random 8-character hex key and answers with
//! the short URL; `GET /:key` redirects back to the stored URL. Mappings
//! live in memory only.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

pub use config::AppConfig;
pub use directory::Directory;
pub use error::DirectoryError;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub directory: Directory,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(directory: Directory, config: AppConfig) -> Arc<Self> {
        Arc::new(Self { directory, config })
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>) -> Router {
    let hardening = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ));

    Router::new()
        .route(
            "/",
            get(handlers::shorten::index)
                .post(handlers::shorten::create)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(|| async { StatusCode::OK }))
        // Short-link redirect; static routes above take priority
        .route(
            "/:key",
            get(handlers::redirect::redirect).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(hardening)
        .layer(TraceLayer::new_for_http())
}
