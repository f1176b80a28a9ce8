//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;

use tower_http::compression::CompressionLayer;

use super::auth::{AuthState, require_auth};
use super::middleware;
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{feedback, health};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;

        // Clone shutdown before moving app
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let auth_state = AuthState {
            credentials: app.credentials.clone(),
            enabled: app.config.auth.enabled,
        };

        // Feedback routes sit behind basic auth; health and docs stay open
        let order_routes =
            feedback::order::routes(app.order_feedback.clone()).layer(
                axum::middleware::from_fn_with_state(auth_state.clone(), require_auth),
            );
        let product_routes =
            feedback::product::routes(app.product_feedback.clone()).layer(
                axum::middleware::from_fn_with_state(auth_state, require_auth),
            );

        let router = Router::new()
            .route("/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .route("/api/docs/", get(swagger_ui_html))
            .nest("/api/orderfeedback", order_routes)
            .nest("/api/productfeedback", product_routes)
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(middleware::cors())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        tracing::info!(host = %host, port, "API server listening");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
