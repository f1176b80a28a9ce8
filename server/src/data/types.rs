//! Shared row types for the transactional backends (SQLite, PostgreSQL)
//!
//! All timestamps are epoch milliseconds. Rows serialize to JSON for the
//! cache layer; API response shapes live with their routes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::cache::CacheEntity;

// ============================================================================
// Customer types
// ============================================================================

/// Customer row from database
///
/// Customers are provisioned upstream; this service only reads them. The
/// password is the opaque credential Basic auth compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl CacheEntity for CustomerRow {
    const TYPE_NAME: &'static str = "Customer";
}

// ============================================================================
// Order types
// ============================================================================

/// Order row from database
///
/// `feedback_id` is the back-reference to this order's feedback; NULL while
/// the order is unrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub create_time: i64,
    pub total_price: f64,
    pub feedback_id: Option<i64>,
}

impl CacheEntity for OrderRow {
    const TYPE_NAME: &'static str = "Order";
}

/// Order line row from database
///
/// One row per product in an order. `feedback_id` is the back-reference to
/// this line's feedback; NULL while the line is unrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProductRow {
    pub order_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub feedback_id: Option<i64>,
}

impl CacheEntity for OrderProductRow {
    const TYPE_NAME: &'static str = "OrderProduct";
}

// ============================================================================
// Product types
// ============================================================================

/// Product row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

impl CacheEntity for ProductRow {
    const TYPE_NAME: &'static str = "Product";
}

// ============================================================================
// Feedback types
// ============================================================================

/// What a piece of feedback rates: a whole order or one order line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    #[default]
    Order,
    Product,
}

impl FeedbackKind {
    /// Parse from the string stored in the database
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "order" => Some(Self::Order),
            "product" => Some(Self::Product),
            _ => None,
        }
    }

    /// String representation stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feedback row from database
///
/// `products` is transient: the latest-feedback view populates it from the
/// associated order's lines, and older cache entries without the field
/// deserialize to an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub kind: FeedbackKind,
    pub customer_id: i64,
    pub order_id: i64,
    pub create_time: i64,
    #[serde(default)]
    pub products: Vec<ProductRow>,
}

impl CacheEntity for FeedbackRow {
    const TYPE_NAME: &'static str = "Feedback";
}

/// Fields for a feedback row about to be inserted
///
/// The kind is fixed by the repository method that inserts the row.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub rating: i32,
    pub comment: Option<String>,
    pub customer_id: i64,
    pub order_id: i64,
}
