//! Repository traits for database backends
//!
//! This module defines the trait that provides a unified interface for
//! database operations across backends. Each backend (SQLite, PostgreSQL)
//! implements it with its own SQL. Caching is layered above this trait by
//! the domain services; repositories only talk to the database.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    CustomerRow, FeedbackRow, NewFeedback, OrderProductRow, OrderRow, ProductRow,
};

/// Repository trait for transactional operations
///
/// Implemented by SQLite and PostgreSQL backends.
#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== Customer Operations ====================

    /// Get a customer by ID
    async fn get_customer(&self, id: i64) -> Result<Option<CustomerRow>, DataError>;

    /// Get a customer by username (exact match)
    async fn get_customer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CustomerRow>, DataError>;

    // ==================== Order Operations ====================

    /// Get an order by ID
    async fn get_order(&self, id: i64) -> Result<Option<OrderRow>, DataError>;

    /// List the lines of an order
    async fn list_order_products(&self, order_id: i64) -> Result<Vec<OrderProductRow>, DataError>;

    /// Get one order line by its order and product pair
    async fn get_order_product(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<Option<OrderProductRow>, DataError>;

    // ==================== Product Operations ====================

    /// Get a product by ID
    async fn get_product(&self, id: i64) -> Result<Option<ProductRow>, DataError>;

    /// Get several products by ID in one query (order unspecified)
    async fn list_products_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, DataError>;

    // ==================== Feedback Operations ====================

    /// Get a feedback row by ID
    async fn get_feedback(&self, id: i64) -> Result<Option<FeedbackRow>, DataError>;

    /// List the newest feedback rows, optionally filtered by rating
    ///
    /// Ordered newest first; ties on create_time break by descending id.
    async fn list_latest_feedback(
        &self,
        rating: Option<i32>,
        limit: i64,
    ) -> Result<Vec<FeedbackRow>, DataError>;

    /// Insert order feedback and set the order's back-reference, atomically
    ///
    /// Returns `Err(DataError::Conflict)` when the order already carries a
    /// feedback reference; concurrent creators race on the guarded update
    /// and exactly one wins.
    async fn create_order_feedback(&self, new: &NewFeedback) -> Result<FeedbackRow, DataError>;

    /// Insert product feedback and set the order line's back-reference, atomically
    ///
    /// Same conflict contract as [`create_order_feedback`], guarding the
    /// order line instead of the order.
    ///
    /// [`create_order_feedback`]: TransactionalRepository::create_order_feedback
    async fn create_product_feedback(
        &self,
        new: &NewFeedback,
        product_id: i64,
    ) -> Result<FeedbackRow, DataError>;

    /// Update a feedback row's rating and comment
    ///
    /// Returns the updated row, or None when no row with that id exists.
    async fn update_feedback(
        &self,
        id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Option<FeedbackRow>, DataError>;

    /// Clear the order's back-reference and delete the feedback row, atomically
    ///
    /// Returns true when the feedback row was deleted.
    async fn delete_order_feedback(
        &self,
        order_id: i64,
        feedback_id: i64,
    ) -> Result<bool, DataError>;

    /// Clear the order line's back-reference and delete the feedback row, atomically
    ///
    /// Returns true when the feedback row was deleted.
    async fn delete_product_feedback(
        &self,
        order_id: i64,
        product_id: i64,
        feedback_id: i64,
    ) -> Result<bool, DataError>;
}
