//! Shared API types
//!
//! The error envelope is the same for every endpoint: a JSON object with
//! `error`, `code` and `message`. Domain errors map onto it in one place
//! so route handlers only bubble `DomainError` up with `?`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::CustomerNotFound(_) => Self::not_found("CUSTOMER_NOT_FOUND", err.to_string()),
            DomainError::OrderNotFound(_) => Self::not_found("ORDER_NOT_FOUND", err.to_string()),
            DomainError::ProductNotFound(_) => Self::not_found("PRODUCT_NOT_FOUND", err.to_string()),
            DomainError::OrderProductsNotFound(_) | DomainError::OrderProductsUnresolved(_) => {
                Self::not_found("ORDER_PRODUCTS_NOT_FOUND", err.to_string())
            }
            DomainError::OrderProductNotFound { .. } => {
                Self::not_found("ORDER_PRODUCT_NOT_FOUND", err.to_string())
            }
            DomainError::OrderNotRated(_) => Self::not_found("ORDER_NOT_RATED", err.to_string()),
            DomainError::ProductNotRated { .. } => {
                Self::not_found("PRODUCT_NOT_RATED", err.to_string())
            }
            DomainError::OrderNotOwned { .. } => Self::forbidden("ORDER_NOT_OWNED", err.to_string()),
            DomainError::OrderAlreadyRated => Self::conflict("ORDER_ALREADY_RATED", err.to_string()),
            DomainError::ProductAlreadyRated => {
                Self::conflict("PRODUCT_ALREADY_RATED", err.to_string())
            }
            DomainError::InvalidRating(_) => Self::bad_request("INVALID_RATING", err.to_string()),
            DomainError::Data(data_err) => {
                // Infrastructure detail stays in the log, not the response
                tracing::error!(error = %data_err, "Data error");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", code, message)
            }
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Plain confirmation body for endpoints without a resource to return
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_domain_error_status_mapping() {
        assert_eq!(
            status_of(DomainError::OrderNotFound(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::OrderNotRated(1).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(
                DomainError::OrderNotOwned {
                    customer_id: 1,
                    order_id: 2
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(DomainError::OrderAlreadyRated.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::ProductAlreadyRated.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::InvalidRating(0).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::Data(crate::data::DataError::Conflict("x".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_message_reaches_client() {
        let err: ApiError = DomainError::InvalidRating(9).into();
        match err {
            ApiError::BadRequest { message, .. } => {
                assert_eq!(message, "Invalid rating. The rating must be between 1 to 5.");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err: ApiError =
            DomainError::Data(crate::data::DataError::Config("pool exhausted".into())).into();
        match err {
            ApiError::Internal { message } => {
                assert_eq!(message, "Database operation failed");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
