//! Order feedback endpoints
//!
//! Nested under `/api/orderfeedback`. The literal `GetLatest` segment
//! takes precedence over the `{order_id}` parameter, so the view
//! endpoints never shadow an order id.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::types::{FeedbackDto, FeedbackRequest};
use crate::api::extractors::CallerId;
use crate::api::types::{ApiError, MessageResponse};
use crate::domain::{FeedbackDraft, OrderFeedbackService};

pub fn routes(service: Arc<OrderFeedbackService>) -> Router {
    Router::new()
        .route("/GetLatest", get(get_latest))
        .route("/GetLatest/{rating}", get(get_latest_by_rating))
        .route(
            "/{order_id}",
            get(get_feedback)
                .post(create_feedback)
                .put(update_feedback)
                .delete(delete_feedback),
        )
        .with_state(service)
}

/// Rate an order
#[utoipa::path(
    post,
    path = "/api/orderfeedback/{order_id}",
    tag = "order-feedback",
    params(
        ("order_id" = i64, Path, description = "Order to rate"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback created", body = FeedbackDto),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Customer or order not found"),
        (status = 409, description = "Order already rated")
    )
)]
pub async fn create_feedback(
    State(service): State<Arc<OrderFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path(order_id): Path<i64>,
    Json(body): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = FeedbackDraft {
        rating: body.rating,
        comment: body.comment,
    };
    let feedback = service.create(customer_id, order_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(FeedbackDto::from(feedback))))
}

/// Get the feedback of an order
#[utoipa::path(
    get,
    path = "/api/orderfeedback/{order_id}",
    tag = "order-feedback",
    params(
        ("order_id" = i64, Path, description = "Order to look up"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    responses(
        (status = 200, description = "The order's feedback", body = FeedbackDto),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order not found or not rated")
    )
)]
pub async fn get_feedback(
    State(service): State<Arc<OrderFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path(order_id): Path<i64>,
) -> Result<Json<FeedbackDto>, ApiError> {
    let feedback = service.get(customer_id, order_id).await?;
    Ok(Json(FeedbackDto::from(feedback)))
}

/// List the newest feedback across all customers
#[utoipa::path(
    get,
    path = "/api/orderfeedback/GetLatest",
    tag = "order-feedback",
    responses(
        (status = 200, description = "Newest feedback, newest first", body = [FeedbackDto])
    )
)]
pub async fn get_latest(
    State(service): State<Arc<OrderFeedbackService>>,
) -> Result<Json<Vec<FeedbackDto>>, ApiError> {
    let list = service.get_latest(None).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

/// List the newest feedback with a given rating
#[utoipa::path(
    get,
    path = "/api/orderfeedback/GetLatest/{rating}",
    tag = "order-feedback",
    params(("rating" = i32, Path, description = "Rating to filter by, 1 to 5; 0 lists unfiltered")),
    responses(
        (status = 200, description = "Newest feedback with that rating", body = [FeedbackDto]),
        (status = 400, description = "Rating outside 1 to 5")
    )
)]
pub async fn get_latest_by_rating(
    State(service): State<Arc<OrderFeedbackService>>,
    Path(rating): Path<i32>,
) -> Result<Json<Vec<FeedbackDto>>, ApiError> {
    let list = service.get_latest(Some(rating)).await?;
    Ok(Json(list.into_iter().map(Into::into).collect()))
}

/// Change the rating or comment of an order's feedback
#[utoipa::path(
    put,
    path = "/api/orderfeedback/{order_id}",
    tag = "order-feedback",
    params(
        ("order_id" = i64, Path, description = "Order whose feedback to change"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Updated feedback", body = FeedbackDto),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order not found or not rated")
    )
)]
pub async fn update_feedback(
    State(service): State<Arc<OrderFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path(order_id): Path<i64>,
    Json(body): Json<FeedbackRequest>,
) -> Result<Json<FeedbackDto>, ApiError> {
    let draft = FeedbackDraft {
        rating: body.rating,
        comment: body.comment,
    };
    let feedback = service.update(customer_id, order_id, &draft).await?;
    Ok(Json(FeedbackDto::from(feedback)))
}

/// Remove an order's feedback
#[utoipa::path(
    delete,
    path = "/api/orderfeedback/{order_id}",
    tag = "order-feedback",
    params(
        ("order_id" = i64, Path, description = "Order whose feedback to remove"),
        ("UserId" = i64, Header, description = "Acting customer id")
    ),
    responses(
        (status = 200, description = "Feedback removed", body = MessageResponse),
        (status = 403, description = "Order belongs to another customer"),
        (status = 404, description = "Order not found or not rated")
    )
)]
pub async fn delete_feedback(
    State(service): State<Arc<OrderFeedbackService>>,
    CallerId(customer_id): CallerId,
    Path(order_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete(customer_id, order_id).await?;
    Ok(Json(MessageResponse::new("Correctly Deleted")))
}
