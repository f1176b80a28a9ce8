//! Feedback API request and response shapes

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::types::{FeedbackRow, ProductRow};

/// Rating and comment supplied by the client
#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    /// Rating from 1 (worst) to 5 (best)
    pub rating: i32,
    /// Optional free-text comment
    pub comment: Option<String>,
}

/// A product referenced by a piece of feedback
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl From<ProductRow> for ProductDto {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
        }
    }
}

/// A piece of feedback with the products it concerns
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackDto {
    pub id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    /// What this feedback rates: "order" or "product"
    pub kind: &'static str,
    pub customer_id: i64,
    pub order_id: i64,
    /// Creation time in epoch milliseconds
    pub create_time: i64,
    pub products: Vec<ProductDto>,
}

impl From<FeedbackRow> for FeedbackDto {
    fn from(row: FeedbackRow) -> Self {
        Self {
            id: row.id,
            rating: row.rating,
            comment: row.comment,
            kind: row.kind.as_str(),
            customer_id: row.customer_id,
            order_id: row.order_id,
            create_time: row.create_time,
            products: row.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::FeedbackKind;

    #[test]
    fn test_dto_from_row() {
        let row = FeedbackRow {
            id: 3,
            rating: 4,
            comment: Some("crusty".to_string()),
            kind: FeedbackKind::Product,
            customer_id: 1,
            order_id: 2,
            create_time: 1700000000000,
            products: vec![ProductRow {
                id: 9,
                name: "Sourdough Loaf".to_string(),
                price: 4.5,
            }],
        };

        let dto = FeedbackDto::from(row);
        assert_eq!(dto.kind, "product");
        assert_eq!(dto.products.len(), 1);
        assert_eq!(dto.products[0].name, "Sourdough Loaf");
    }

    #[test]
    fn test_request_parses_without_comment() {
        let request: FeedbackRequest = serde_json::from_str(r#"{ "rating": 5 }"#).unwrap();
        assert_eq!(request.rating, 5);
        assert!(request.comment.is_none());
    }
}
