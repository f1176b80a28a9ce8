//! Product feedback endpoints
//!
//! Nested under `/api/productfeedback`. Every route addresses one line of
//! an order by the order/product id pair.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::types::{FeedbackDto, FeedbackRequest};
use crate::api::extractors::CallerId;
use crate::api::types::{ApiError, MessageResponse};
use crate::domain::{FeedbackDraft, ProductFeedbackService};

pub fn routes(service: Arc<ProductFeedbackService>) -> Router {
    Router::new()
        .route(
            "/{order_id}/{product_id}",
            get(get_feedback)
                .post(create_feedback)
                .put(update_feedback)
                .delete(delete_feedback),
        )
        .with_state(service)
}

/// Rate one product of an order
#[utoipa::path(
    post,
    path = "/api/productfeedback/{order_id}/{product_id}",
    tag = "product-feedback",
    params(
        ("order_id" = i64, Path, description = "Order containing the product"),
        ("product_id" = i64, Path, description = "Product to rate"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackDto),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order, product or order line not found"),
        (status = 409, description = "Product already rated in this order")
    )
)]
pub async fn create_feedback(
    State(service): State<Arc<ProductFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path((order_id, product_id)): Path<(i64, i64)>,
    Json(body): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = FeedbackDraft {
        rating: body.rating,
        comment: body.comment,
    };
    let feedback = service
        .create(customer_id, order_id, product_id, &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(FeedbackDto::from(feedback))))
}

/// Get the feedback on one product of an order
#[utoipa::path(
    get,
    path = "/api/productfeedback/{order_id}/{product_id}",
    tag = "product-feedback",
    params(
        ("order_id" = i64, Path, description = "Order containing the product"),
        ("product_id" = i64, Path, description = "Product to look up"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    responses(
        (status = 200, description = "The line's feedback", body = FeedbackDto),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order line not found or not rated")
    )
)]
pub async fn get_feedback(
    State(service): State<Arc<ProductFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path((order_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<FeedbackDto>, ApiError> {
    let feedback = service.get(customer_id, order_id, product_id).await?;
    Ok(Json(FeedbackDto::from(feedback)))
}

/// Change the rating or comment of a product's feedback
#[utoipa::path(
    put,
    path = "/api/productfeedback/{order_id}/{product_id}",
    tag = "product-feedback",
    params(
        ("order_id" = i64, Path, description = "Order containing the product"),
        ("product_id" = i64, Path, description = "Product whose feedback to change"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Updated feedback", body = FeedbackDto),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order line not found or not rated")
    )
)]
pub async fn update_feedback(
    State(service): State<Arc<ProductFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path((order_id, product_id)): Path<(i64, i64)>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<FeedbackDto>, ApiError> {
    let draft = FeedbackDraft {
        rating: body.rating,
        comment: body.comment,
    };
    let feedback = service
        .update(customer_id, order_id, product_id, &draft)
        .await?;
    Ok(Json(FeedbackDto::from(feedback)))
}

/// Remove a product's feedback
#[utoipa::path(
    delete,
    path = "/api/productfeedback/{order_id}/{product_id}",
    tag = "product-feedback",
    params(
        ("order_id" = i64, Path, description = "Order containing the product"),
        ("product_id" = i64, Path, description = "Product whose feedback to remove"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    responses(
        (status = 200, description = "Feedback removed", body = MessageResponse),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order line not found or not rated")
    )
)]
pub async fn delete_feedback(
    State(service): State<Arc<ProductFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path((order_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete(customer_id, order_id, product_id).await?;
    Ok(Json(MessageResponse::new("Correctly Deleted")))
}
