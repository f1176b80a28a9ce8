//! Cache-aside entity lookups
//!
//! Each lookup checks its list bucket first, falls back to the repository
//! on a miss, and writes the result back through the cache. The database
//! stays the source of truth; a cache hit only short-circuits the read.

use std::sync::Arc;

use crate::data::TransactionalRepository;
use crate::data::cache::EntityCache;
use crate::data::types::{CustomerRow, OrderProductRow, OrderRow, ProductRow};

use super::error::DomainError;

/// Customer reads (customers are provisioned upstream, never written here)
#[derive(Clone)]
pub struct CustomerLookup {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
}

impl CustomerLookup {
    pub fn new(repository: Arc<dyn TransactionalRepository>, cache: Arc<EntityCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn by_id(&self, id: i64) -> Result<CustomerRow, DomainError> {
        let key = self.cache.keys().entity::<CustomerRow>(id);
        if let Some(hit) = self.cache.find::<CustomerRow, _>(&key, |c| c.id == id).await {
            tracing::trace!(customer_id = id, "Customer cache hit");
            return Ok(hit);
        }

        let row = self
            .repository
            .get_customer(id)
            .await?
            .ok_or(DomainError::CustomerNotFound(id))?;
        self.cache.put_list(&key, std::slice::from_ref(&row)).await;
        Ok(row)
    }
}

/// Order reads
///
/// Orders carry the feedback back-reference, so mutation paths that change
/// it must refresh or evict the order's bucket themselves.
#[derive(Clone)]
pub struct OrderLookup {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
}

impl OrderLookup {
    pub fn new(repository: Arc<dyn TransactionalRepository>, cache: Arc<EntityCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn by_id(&self, id: i64) -> Result<OrderRow, DomainError> {
        let key = self.cache.keys().entity::<OrderRow>(id);
        if let Some(hit) = self.cache.find::<OrderRow, _>(&key, |o| o.id == id).await {
            tracing::trace!(order_id = id, "Order cache hit");
            return Ok(hit);
        }

        let row = self
            .repository
            .get_order(id)
            .await?
            .ok_or(DomainError::OrderNotFound(id))?;
        self.cache.put_list(&key, std::slice::from_ref(&row)).await;
        Ok(row)
    }
}

/// Product and order-line reads
#[derive(Clone)]
pub struct ProductLookup {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
}

impl ProductLookup {
    pub fn new(repository: Arc<dyn TransactionalRepository>, cache: Arc<EntityCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn by_id(&self, id: i64) -> Result<ProductRow, DomainError> {
        let key = self.cache.keys().entity::<ProductRow>(id);
        if let Some(hit) = self.cache.find::<ProductRow, _>(&key, |p| p.id == id).await {
            tracing::trace!(product_id = id, "Product cache hit");
            return Ok(hit);
        }

        let row = self
            .repository
            .get_product(id)
            .await?
            .ok_or(DomainError::ProductNotFound(id))?;
        self.cache.put_list(&key, std::slice::from_ref(&row)).await;
        Ok(row)
    }

    /// All line rows of an order, cached as one bucket under the order id
    pub async fn lines_by_order(&self, order_id: i64) -> Result<Vec<OrderProductRow>, DomainError> {
        let key = self.cache.keys().entity::<OrderProductRow>(order_id);
        if let Some(lines) = self.cache.get_list::<OrderProductRow>(&key).await
            && !lines.is_empty()
        {
            tracing::trace!(order_id, "Order lines cache hit");
            return Ok(lines);
        }

        let lines = self.repository.list_order_products(order_id).await?;
        if lines.is_empty() {
            return Err(DomainError::OrderProductsNotFound(order_id));
        }
        self.cache.put_list(&key, &lines).await;
        Ok(lines)
    }

    /// One line row by its order and product pair
    pub async fn line(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<OrderProductRow, DomainError> {
        let key = self.cache.keys().entity::<OrderProductRow>(order_id);
        if let Some(hit) = self
            .cache
            .find::<OrderProductRow, _>(&key, |l| {
                l.order_id == order_id && l.product_id == product_id
            })
            .await
        {
            return Ok(hit);
        }

        self.repository
            .get_order_product(order_id, product_id)
            .await?
            .ok_or(DomainError::OrderProductNotFound {
                order_id,
                product_id,
            })
    }

    /// The products of an order, resolved through its line rows
    ///
    /// An order without line rows and line rows whose products no longer
    /// resolve are reported as two different not-found causes.
    pub async fn by_order(&self, order_id: i64) -> Result<Vec<ProductRow>, DomainError> {
        let lines = self.lines_by_order(order_id).await?;
        let ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();

        let products = self.repository.list_products_by_ids(&ids).await?;
        if products.is_empty() {
            return Err(DomainError::OrderProductsUnresolved(order_id));
        }
        Ok(products)
    }

    /// Evict the cached line-row bucket for an order
    ///
    /// Called after a mutation changed a line's feedback back-reference so
    /// the next read repopulates from the store.
    pub async fn evict_lines(&self, order_id: i64) {
        let key = self.cache.keys().entity::<OrderProductRow>(order_id);
        self.cache.remove(&key).await;
    }
}
