//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::feedback::types::{FeedbackDto, FeedbackRequest, ProductDto};
use crate::api::routes::feedback::{order, product};
use crate::api::routes::health;
use crate::api::types::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rately API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Order and product feedback service"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "order-feedback", description = "Feedback on whole orders"),
        (name = "product-feedback", description = "Feedback on products within an order")
    ),
    paths(
        // Health
        health::health,
        // Order feedback
        order::create_feedback,
        order::get_feedback,
        order::get_latest,
        order::get_latest_by_rating,
        order::update_feedback,
        order::delete_feedback,
        // Product feedback
        product::create_feedback,
        product::get_feedback,
        product::update_feedback,
        product::delete_feedback,
    ),
    components(schemas(
        health::HealthResponse,
        FeedbackRequest,
        FeedbackDto,
        ProductDto,
        MessageResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rately API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_feedback_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| *p == "/api/orderfeedback/{order_id}"));
        assert!(paths.iter().any(|p| *p == "/api/orderfeedback/GetLatest"));
        assert!(
            paths
                .iter()
                .any(|p| *p == "/api/productfeedback/{order_id}/{product_id}")
        );
        assert!(paths.iter().any(|p| *p == "/health"));
    }
}
