//! TransactionalRepository trait implementation for PostgreSQL
//!
//! This module implements the TransactionalRepository trait for Arc<PostgresService>,
//! providing a unified interface for all transactional database operations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::TransactionalRepository;
use crate::data::types::{
    CustomerRow, FeedbackRow, NewFeedback, OrderProductRow, OrderRow, ProductRow,
};

use super::PostgresService;
use super::repositories::{customer, feedback, order, product};

#[async_trait]
impl TransactionalRepository for Arc<PostgresService> {
    // ==================== Customer Operations ====================

    async fn get_customer(&self, id: i64) -> Result<Option<CustomerRow>, DataError> {
        customer::get_customer(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn get_customer_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CustomerRow>, DataError> {
        customer::get_by_username(self.pool(), username)
            .await
            .map_err(Into::into)
    }

    // ==================== Order Operations ====================

    async fn get_order(&self, id: i64) -> Result<Option<OrderRow>, DataError> {
        order::get_order(self.pool(), id).await.map_err(Into::into)
    }

    async fn list_order_products(&self, order_id: i64) -> Result<Vec<OrderProductRow>, DataError> {
        order::list_order_products(self.pool(), order_id)
            .await
            .map_err(Into::into)
    }

    async fn get_order_product(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<Option<OrderProductRow>, DataError> {
        order::get_order_product(self.pool(), order_id, product_id)
            .await
            .map_err(Into::into)
    }

    // ==================== Product Operations ====================

    async fn get_product(&self, id: i64) -> Result<Option<ProductRow>, DataError> {
        product::get_product(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_products_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, DataError> {
        product::list_by_ids(self.pool(), ids)
            .await
            .map_err(Into::into)
    }

    // ==================== Feedback Operations ====================

    async fn get_feedback(&self, id: i64) -> Result<Option<FeedbackRow>, DataError> {
        feedback::get_feedback(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn list_latest_feedback(
        &self,
        rating: Option<i32>,
        limit: i64,
    ) -> Result<Vec<FeedbackRow>, DataError> {
        feedback::list_latest(self.pool(), rating, limit)
            .await
            .map_err(Into::into)
    }

    async fn create_order_feedback(&self, new: &NewFeedback) -> Result<FeedbackRow, DataError> {
        feedback::create_order_feedback(self.pool(), new)
            .await
            .map_err(Into::into)
    }

    async fn create_product_feedback(
        &self,
        new: &NewFeedback,
        product_id: i64,
    ) -> Result<FeedbackRow, DataError> {
        feedback::create_product_feedback(self.pool(), new, product_id)
            .await
            .map_err(Into::into)
    }

    async fn update_feedback(
        &self,
        id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Option<FeedbackRow>, DataError> {
        feedback::update_feedback(self.pool(), id, rating, comment)
            .await
            .map_err(Into::into)
    }

    async fn delete_order_feedback(
        &self,
        order_id: i64,
        feedback_id: i64,
    ) -> Result<bool, DataError> {
        feedback::delete_order_feedback(self.pool(), order_id, feedback_id)
            .await
            .map_err(Into::into)
    }

    async fn delete_product_feedback(
        &self,
        order_id: i64,
        product_id: i64,
        feedback_id: i64,
    ) -> Result<bool, DataError> {
        feedback::delete_product_feedback(self.pool(), order_id, product_id, feedback_id)
            .await
            .map_err(Into::into)
    }
}
