//! HTTP middleware (CORS, 404 handler)

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use tower_http::cors::{Any, CorsLayer};

/// Create the CORS layer
///
/// The API serves arbitrary storefront frontends, so any origin may call
/// it. Credentials ride in the Authorization header, not in cookies, which
/// keeps the permissive origin safe.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("userid"),
        ])
}

const MAX_404_BODY_LOG: usize = 64 * 1024; // 64KB limit for logging

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl IntoResponse {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return StatusCode::NOT_FOUND;
    }

    let method = req.method().clone();
    let uri = req.uri().clone();

    let body_bytes = match to_bytes(req.into_body(), MAX_404_BODY_LOG).await {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::debug!("[404] {} {} (failed to read body)", method, uri);
            return StatusCode::NOT_FOUND;
        }
    };

    if body_bytes.is_empty() {
        tracing::debug!("[404] {} {}", method, uri);
    } else {
        let body = String::from_utf8(body_bytes.to_vec())
            .unwrap_or_else(|_| format!("<binary {} bytes>", body_bytes.len()));
        tracing::debug!("[404] {} {}\n{}", method, uri, body);
    }

    StatusCode::NOT_FOUND
}
