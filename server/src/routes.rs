use axum::{routing::get, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::embedded;

/// Routes of the static host: the two pages, embedded assets, and the wasm
/// package read from disk
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(embedded::serve_index))
        .route("/index.html", get(embedded::serve_index))
        .route("/gallery.html", get(embedded::serve_gallery))
        .route("/public/{*path}", get(embedded::serve_public))
        .route("/health", get(health_check))
        .nest_service("/pkg", ServeDir::new(&config.pkg_dir))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
