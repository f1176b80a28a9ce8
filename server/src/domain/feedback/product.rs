//! Product-level feedback
//!
//! Mirrors the order-level service but keys everything on the (order,
//! product) line. The cached line-row bucket holds every line of the
//! order, so mutations evict the whole bucket instead of patching it.

use std::sync::Arc;

use crate::data::TransactionalRepository;
use crate::data::cache::EntityCache;
use crate::data::types::{FeedbackKind, FeedbackRow, NewFeedback, OrderRow};
use crate::domain::error::DomainError;
use crate::domain::lookup::{CustomerLookup, OrderLookup, ProductLookup};

use super::{FeedbackDraft, invalidate_latest_views, validate_rating};

pub struct ProductFeedbackService {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
    customers: CustomerLookup,
    orders: OrderLookup,
    products: ProductLookup,
}

impl ProductFeedbackService {
    pub fn new(
        repository: Arc<dyn TransactionalRepository>,
        cache: Arc<EntityCache>,
        customers: CustomerLookup,
        orders: OrderLookup,
        products: ProductLookup,
    ) -> Self {
        Self {
            repository,
            cache,
            customers,
            orders,
            products,
        }
    }

    async fn owned_order(&self, customer_id: i64, order_id: i64) -> Result<OrderRow, DomainError> {
        let customer = self.customers.by_id(customer_id).await?;
        let order = self.orders.by_id(order_id).await?;
        if order.customer_id != customer.id {
            return Err(DomainError::OrderNotOwned {
                customer_id,
                order_id,
            });
        }
        Ok(order)
    }

    /// The feedback on one line of an order, with the rated product attached
    async fn feedback_for_line(
        &self,
        order_id: i64,
        product_id: i64,
    ) -> Result<FeedbackRow, DomainError> {
        let key = self
            .cache
            .keys()
            .order_line::<FeedbackRow>(order_id, product_id);
        if let Some(hit) = self
            .cache
            .find::<FeedbackRow, _>(&key, |f| {
                f.kind == FeedbackKind::Product && f.order_id == order_id
            })
            .await
        {
            tracing::trace!(order_id, product_id, "Product feedback cache hit");
            return Ok(hit);
        }

        let line = self.products.line(order_id, product_id).await?;
        let feedback_id = line.feedback_id.ok_or(DomainError::ProductNotRated {
            order_id,
            product_id,
        })?;
        let mut feedback = self
            .repository
            .get_feedback(feedback_id)
            .await?
            .filter(|f| f.kind == FeedbackKind::Product)
            .ok_or(DomainError::ProductNotRated {
                order_id,
                product_id,
            })?;
        feedback.products = vec![self.products.by_id(product_id).await?];

        self.cache
            .put_list(&key, std::slice::from_ref(&feedback))
            .await;
        Ok(feedback)
    }

    /// Rate one product within an order
    pub async fn create(
        &self,
        customer_id: i64,
        order_id: i64,
        product_id: i64,
        draft: &FeedbackDraft,
    ) -> Result<FeedbackRow, DomainError> {
        self.owned_order(customer_id, order_id).await?;

        match self.feedback_for_line(order_id, product_id).await {
            Ok(_) => return Err(DomainError::ProductAlreadyRated),
            Err(err) if err.is_not_found() => {
                // The line itself must exist even when it has no feedback
                self.products.line(order_id, product_id).await?;
            }
            Err(err) => return Err(err),
        }
        validate_rating(draft.rating)?;
        let product = self.products.by_id(product_id).await?;

        let new = NewFeedback {
            rating: draft.rating,
            comment: draft.comment.clone(),
            customer_id,
            order_id,
        };
        let mut feedback = self
            .repository
            .create_product_feedback(&new, product_id)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    DomainError::ProductAlreadyRated
                } else {
                    DomainError::Data(err)
                }
            })?;
        feedback.products = vec![product];

        tracing::info!(
            order_id,
            product_id,
            feedback_id = feedback.id,
            "Product feedback created"
        );

        let key = self
            .cache
            .keys()
            .order_line::<FeedbackRow>(order_id, product_id);
        self.cache
            .put_list(&key, std::slice::from_ref(&feedback))
            .await;
        // The line bucket holds the whole order's lines and one of them
        // changed its back-reference
        self.products.evict_lines(order_id).await;

        invalidate_latest_views(&self.cache, &[feedback.rating]).await;
        Ok(feedback)
    }

    /// The feedback a customer left on one product of their order
    pub async fn get(
        &self,
        customer_id: i64,
        order_id: i64,
        product_id: i64,
    ) -> Result<FeedbackRow, DomainError> {
        self.owned_order(customer_id, order_id).await?;
        self.feedback_for_line(order_id, product_id).await
    }

    /// Overwrite the rating and comment of existing product feedback
    pub async fn update(
        &self,
        customer_id: i64,
        order_id: i64,
        product_id: i64,
        draft: &FeedbackDraft,
    ) -> Result<FeedbackRow, DomainError> {
        let current = self.get(customer_id, order_id, product_id).await?;
        validate_rating(draft.rating)?;

        let mut updated = self
            .repository
            .update_feedback(current.id, draft.rating, draft.comment.as_deref())
            .await?
            .ok_or(DomainError::ProductNotRated {
                order_id,
                product_id,
            })?;
        updated.products = current.products;

        tracing::info!(
            order_id,
            product_id,
            feedback_id = updated.id,
            "Product feedback updated"
        );

        let key = self
            .cache
            .keys()
            .order_line::<FeedbackRow>(order_id, product_id);
        self.cache
            .put_list(&key, std::slice::from_ref(&updated))
            .await;

        if current.rating != updated.rating {
            invalidate_latest_views(&self.cache, &[current.rating, updated.rating]).await;
        } else {
            invalidate_latest_views(&self.cache, &[updated.rating]).await;
        }
        Ok(updated)
    }

    /// Remove the feedback from an order line, freeing it for re-rating
    pub async fn delete(
        &self,
        customer_id: i64,
        order_id: i64,
        product_id: i64,
    ) -> Result<(), DomainError> {
        self.owned_order(customer_id, order_id).await?;
        let feedback = self.feedback_for_line(order_id, product_id).await?;

        let deleted = self
            .repository
            .delete_product_feedback(order_id, product_id, feedback.id)
            .await?;
        if !deleted {
            return Err(DomainError::ProductNotRated {
                order_id,
                product_id,
            });
        }

        tracing::info!(
            order_id,
            product_id,
            feedback_id = feedback.id,
            "Product feedback deleted"
        );

        self.cache
            .remove(
                &self
                    .cache
                    .keys()
                    .order_line::<FeedbackRow>(order_id, product_id),
            )
            .await;
        self.products.evict_lines(order_id).await;
        invalidate_latest_views(&self.cache, &[feedback.rating]).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::testutil::harness;

    fn service_from(h: &crate::domain::feedback::testutil::Harness) -> ProductFeedbackService {
        ProductFeedbackService::new(
            h.repository.clone(),
            h.cache.clone(),
            h.customers.clone(),
            h.orders.clone(),
            h.products.clone(),
        )
    }

    fn draft(rating: i32) -> FeedbackDraft {
        FeedbackDraft {
            rating,
            comment: Some("still warm".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let h = harness().await;
        let service = service_from(&h);

        // Order 1 has a line for product 3
        let created = service.create(1, 1, 3, &draft(4)).await.unwrap();
        assert_eq!(created.kind, FeedbackKind::Product);
        assert_eq!(created.products.len(), 1);
        assert_eq!(created.products[0].id, 3);

        let fetched = service.get(1, 1, 3).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.rating, 4);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_order() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.create(1, 2, 2, &draft(4)).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotOwned { .. }));
    }

    #[tokio::test]
    async fn test_create_missing_line() {
        let h = harness().await;
        let service = service_from(&h);

        // Order 1 has no line for product 2
        let err = service.create(1, 1, 2, &draft(4)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::OrderProductNotFound {
                order_id: 1,
                product_id: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_create_invalid_rating_writes_nothing() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.create(1, 1, 3, &draft(0)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRating(0)));

        let err = service.get(1, 1, 3).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductNotRated { .. }));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let h = harness().await;
        let service = service_from(&h);

        service.create(1, 1, 3, &draft(4)).await.unwrap();
        let err = service.create(1, 1, 3, &draft(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductAlreadyRated));
    }

    #[tokio::test]
    async fn test_lines_rate_independently() {
        let h = harness().await;
        let service = service_from(&h);

        service.create(1, 1, 3, &draft(4)).await.unwrap();
        let other = service.create(1, 1, 1, &draft(5)).await.unwrap();
        assert_eq!(other.products[0].id, 1);
    }

    #[tokio::test]
    async fn test_get_unrated_line() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.get(1, 1, 3).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ProductNotRated {
                order_id: 1,
                product_id: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_update_changes_rating() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, 3, &draft(4)).await.unwrap();

        let updated = service
            .update(
                1,
                1,
                3,
                &FeedbackDraft {
                    rating: 1,
                    comment: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 1);
        assert_eq!(updated.comment, None);

        let fetched = service.get(1, 1, 3).await.unwrap();
        assert_eq!(fetched.rating, 1);
    }

    #[tokio::test]
    async fn test_update_unrated_line() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.update(1, 1, 3, &draft(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductNotRated { .. }));
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, 3, &draft(4)).await.unwrap();

        service.delete(1, 1, 3).await.unwrap();

        let err = service.get(1, 1, 3).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductNotRated { .. }));
    }

    #[tokio::test]
    async fn test_delete_frees_line_for_rerating() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, 3, &draft(4)).await.unwrap();
        service.delete(1, 1, 3).await.unwrap();

        let again = service.create(1, 1, 3, &draft(2)).await.unwrap();
        assert_eq!(again.rating, 2);
    }

    #[tokio::test]
    async fn test_order_and_product_feedback_coexist() {
        let h = harness().await;
        let orders = crate::domain::feedback::OrderFeedbackService::new(
            h.repository.clone(),
            h.cache.clone(),
            h.customers.clone(),
            h.orders.clone(),
            h.products.clone(),
        );
        let products = service_from(&h);

        orders.create(1, 1, &draft(5)).await.unwrap();
        products.create(1, 1, 3, &draft(2)).await.unwrap();

        assert_eq!(orders.get(1, 1).await.unwrap().rating, 5);
        assert_eq!(products.get(1, 1, 3).await.unwrap().rating, 2);
    }
}
