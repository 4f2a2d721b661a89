//! Pages and assets compiled into the binary, so the host ships as a single
//! executable.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "static"]
pub struct StaticAssets;

/// Camera page
pub async fn serve_index() -> Response {
    serve_embedded_file("public/index.html")
}

pub async fn serve_gallery() -> Response {
    serve_embedded_file("public/gallery.html")
}

pub async fn serve_public(Path(path): Path<String>) -> Response {
    serve_embedded_file(&format!("public/{}", path))
}

fn serve_embedded_file(path: &str) -> Response {
    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.to_string())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => {
            tracing::debug!("No embedded file at {}", path);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_embedded() {
        assert!(StaticAssets::get("public/index.html").is_some());
        assert!(StaticAssets::get("public/gallery.html").is_some());
        assert!(StaticAssets::get("public/styles.css").is_some());
    }

    #[test]
    fn test_missing_file_is_404() {
        let response = serve_embedded_file("public/nope.txt");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
