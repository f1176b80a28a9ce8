//! Order-level feedback

use std::sync::Arc;

use crate::core::constants::LATEST_FEEDBACK_LIMIT;
use crate::data::TransactionalRepository;
use crate::data::cache::EntityCache;
use crate::data::types::{FeedbackKind, FeedbackRow, NewFeedback, OrderRow};
use crate::domain::error::DomainError;
use crate::domain::lookup::{CustomerLookup, OrderLookup, ProductLookup};

use super::{FeedbackDraft, invalidate_latest_views, validate_rating};

/// Feedback on a whole order
///
/// Every operation starts from the caller's customer id and refuses to
/// touch orders the customer does not own. Reads go cache-first; writes
/// go through the repository transaction and then repair the cache.
pub struct OrderFeedbackService {
    repository: Arc<dyn TransactionalRepository>,
    cache: Arc<EntityCache>,
    customers: CustomerLookup,
    orders: OrderLookup,
    products: ProductLookup,
}

impl OrderFeedbackService {
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

    /// Resolve the order and verify the customer owns it
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

    /// The feedback of an already-resolved order, with its products attached
    async fn feedback_for(&self, order: &OrderRow) -> Result<FeedbackRow, DomainError> {
        let key = self.cache.keys().entity::<FeedbackRow>(order.id);
        if let Some(hit) = self
            .cache
            .find::<FeedbackRow, _>(&key, |f| {
                f.kind == FeedbackKind::Order && f.order_id == order.id
            })
            .await
        {
            tracing::trace!(order_id = order.id, "Order feedback cache hit");
            return Ok(hit);
        }

        let feedback_id = order
            .feedback_id
            .ok_or(DomainError::OrderNotRated(order.id))?;
        let mut feedback = self
            .repository
            .get_feedback(feedback_id)
            .await?
            .filter(|f| f.kind == FeedbackKind::Order)
            .ok_or(DomainError::OrderNotRated(order.id))?;
        feedback.products = self.products.by_order(order.id).await?;

        self.cache
            .put_list(&key, std::slice::from_ref(&feedback))
            .await;
        Ok(feedback)
    }

    /// Rate an order
    ///
    /// Validation runs before anything is written, so an invalid request
    /// leaves the store untouched. The duplicate check runs twice: a read
    /// probe up front for the common case, and the guarded back-reference
    /// claim inside the transaction for the race.
    pub async fn create(
        &self,
        customer_id: i64,
        order_id: i64,
        draft: &FeedbackDraft,
    ) -> Result<FeedbackRow, DomainError> {
        let order = self.owned_order(customer_id, order_id).await?;

        match self.feedback_for(&order).await {
            Ok(_) => return Err(DomainError::OrderAlreadyRated),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
        validate_rating(draft.rating)?;
        let products = self.products.by_order(order_id).await?;

        let new = NewFeedback {
            rating: draft.rating,
            comment: draft.comment.clone(),
            customer_id,
            order_id,
        };
        let mut feedback = self
            .repository
            .create_order_feedback(&new)
            .await
            .map_err(|err| {
                if err.is_conflict() {
                    DomainError::OrderAlreadyRated
                } else {
                    DomainError::Data(err)
                }
            })?;
        feedback.products = products;

        tracing::info!(order_id, feedback_id = feedback.id, "Order feedback created");

        // Write-through: the new feedback and the order's back-reference
        let feedback_key = self.cache.keys().entity::<FeedbackRow>(order_id);
        self.cache
            .put_list(&feedback_key, std::slice::from_ref(&feedback))
            .await;

        let mut rated_order = order;
        rated_order.feedback_id = Some(feedback.id);
        let order_key = self.cache.keys().entity::<OrderRow>(order_id);
        self.cache
            .put_list(&order_key, std::slice::from_ref(&rated_order))
            .await;

        invalidate_latest_views(&self.cache, &[feedback.rating]).await;
        Ok(feedback)
    }

    /// The feedback a customer left on one of their orders
    pub async fn get(&self, customer_id: i64, order_id: i64) -> Result<FeedbackRow, DomainError> {
        let order = self.owned_order(customer_id, order_id).await?;
        self.feedback_for(&order).await
    }

    /// The newest feedback rows, optionally filtered by rating
    ///
    /// A rating of 0 means "no filter" and shares the unfiltered view key.
    /// Serves the whole list from one view key per filter. An order whose
    /// products no longer resolve keeps its slot with an empty product
    /// list instead of failing the view.
    pub async fn get_latest(&self, rating: Option<i32>) -> Result<Vec<FeedbackRow>, DomainError> {
        let rating = rating.filter(|r| *r != 0);
        if let Some(rating) = rating {
            validate_rating(rating)?;
        }

        let key = self.cache.keys().latest_feedback::<FeedbackRow>(rating);
        if let Some(list) = self.cache.get_list::<FeedbackRow>(&key).await {
            tracing::trace!(?rating, "Latest feedback cache hit");
            return Ok(list);
        }

        let mut list = self
            .repository
            .list_latest_feedback(rating, LATEST_FEEDBACK_LIMIT)
            .await?;
        for feedback in &mut list {
            match self.products.by_order(feedback.order_id).await {
                Ok(products) => feedback.products = products,
                Err(err) if err.is_not_found() => {
                    tracing::debug!(
                        order_id = feedback.order_id,
                        error = %err,
                        "Listing feedback without products"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        self.cache.put_list(&key, &list).await;
        Ok(list)
    }

    /// Overwrite the rating and comment of existing order feedback
    pub async fn update(
        &self,
        customer_id: i64,
        order_id: i64,
        draft: &FeedbackDraft,
    ) -> Result<FeedbackRow, DomainError> {
        let current = self.get(customer_id, order_id).await?;
        validate_rating(draft.rating)?;

        let mut updated = self
            .repository
            .update_feedback(current.id, draft.rating, draft.comment.as_deref())
            .await?
            .ok_or(DomainError::OrderNotRated(order_id))?;
        updated.products = current.products;

        tracing::info!(order_id, feedback_id = updated.id, "Order feedback updated");

        let key = self.cache.keys().entity::<FeedbackRow>(order_id);
        self.cache
            .put_list(&key, std::slice::from_ref(&updated))
            .await;

        // Both the old and new rating views are stale now
        if current.rating != updated.rating {
            invalidate_latest_views(&self.cache, &[current.rating, updated.rating]).await;
        } else {
            invalidate_latest_views(&self.cache, &[updated.rating]).await;
        }
        Ok(updated)
    }

    /// Remove the feedback from an order, freeing it for re-rating
    pub async fn delete(&self, customer_id: i64, order_id: i64) -> Result<(), DomainError> {
        let order = self.owned_order(customer_id, order_id).await?;
        let feedback = self.feedback_for(&order).await?;

        let deleted = self
            .repository
            .delete_order_feedback(order_id, feedback.id)
            .await?;
        if !deleted {
            return Err(DomainError::OrderNotRated(order_id));
        }

        tracing::info!(
            order_id,
            feedback_id = feedback.id,
            "Order feedback deleted"
        );

        self.cache
            .remove(&self.cache.keys().entity::<FeedbackRow>(order_id))
            .await;
        self.cache
            .remove(&self.cache.keys().entity::<OrderRow>(order_id))
            .await;
        invalidate_latest_views(&self.cache, &[feedback.rating]).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feedback::testutil::harness;

    fn service_from(h: &crate::domain::feedback::testutil::Harness) -> OrderFeedbackService {
        OrderFeedbackService::new(
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
            comment: Some("fresh and fast".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let h = harness().await;
        let service = service_from(&h);

        let created = service.create(1, 1, &draft(5)).await.unwrap();
        assert_eq!(created.rating, 5);
        assert_eq!(created.kind, FeedbackKind::Order);
        // Order 1 contains products 1 and 3
        assert_eq!(created.products.len(), 2);

        let fetched = service.get(1, 1).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.rating, 5);
        assert_eq!(fetched.comment, Some("fresh and fast".to_string()));
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_order() {
        let h = harness().await;
        let service = service_from(&h);

        // Order 2 belongs to customer 2
        let err = service.create(1, 2, &draft(5)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::OrderNotOwned {
                customer_id: 1,
                order_id: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_create_invalid_rating_writes_nothing() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.create(1, 1, &draft(9)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRating(9)));

        // Nothing was written, so the order still reads as unrated
        let err = service.get(1, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotRated(1)));
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let h = harness().await;
        let service = service_from(&h);

        service.create(1, 1, &draft(5)).await.unwrap();
        let err = service.create(1, 1, &draft(3)).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderAlreadyRated));
    }

    #[tokio::test]
    async fn test_create_conflicts_even_with_cold_cache() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();

        // Fresh cache drops the probe's knowledge; the guarded claim in the
        // store still refuses the duplicate
        let cold = harness_with_store(&h).await;
        let err = cold.create(1, 1, &draft(2)).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderAlreadyRated));
    }

    /// A second service over the same store but an empty cache
    async fn harness_with_store(
        h: &crate::domain::feedback::testutil::Harness,
    ) -> OrderFeedbackService {
        let fresh = harness().await;
        OrderFeedbackService::new(
            h.repository.clone(),
            fresh.cache.clone(),
            crate::domain::lookup::CustomerLookup::new(h.repository.clone(), fresh.cache.clone()),
            crate::domain::lookup::OrderLookup::new(h.repository.clone(), fresh.cache.clone()),
            crate::domain::lookup::ProductLookup::new(h.repository.clone(), fresh.cache.clone()),
        )
    }

    #[tokio::test]
    async fn test_get_unrated_order() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.get(1, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotRated(1)));
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.get(1, 404).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotFound(404)));
    }

    #[tokio::test]
    async fn test_update_changes_rating_and_cache() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();

        let updated = service
            .update(
                1,
                1,
                &FeedbackDraft {
                    rating: 2,
                    comment: Some("milk was sour".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 2);

        // The cached copy reflects the update immediately
        let fetched = service.get(1, 1).await.unwrap();
        assert_eq!(fetched.rating, 2);
        assert_eq!(fetched.comment, Some("milk was sour".to_string()));
    }

    #[tokio::test]
    async fn test_update_unrated_order() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.update(1, 1, &draft(3)).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotRated(1)));
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();

        service.delete(1, 1).await.unwrap();

        let err = service.get(1, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotRated(1)));
    }

    #[tokio::test]
    async fn test_delete_frees_order_for_rerating() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();
        service.delete(1, 1).await.unwrap();

        let again = service.create(1, 1, &draft(1)).await.unwrap();
        assert_eq!(again.rating, 1);
    }

    #[tokio::test]
    async fn test_get_latest_newest_first() {
        let h = harness().await;
        let service = service_from(&h);
        let first = service.create(1, 1, &draft(5)).await.unwrap();
        let second = service.create(2, 2, &draft(3)).await.unwrap();

        let list = service.get_latest(None).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, second.id);
        assert_eq!(list[1].id, first.id);
    }

    #[tokio::test]
    async fn test_get_latest_rating_filter() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();
        service.create(2, 2, &draft(3)).await.unwrap();

        let list = service.get_latest(Some(3)).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].rating, 3);

        let empty = service.get_latest(Some(1)).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_get_latest_invalid_filter() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.get_latest(Some(6)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRating(6)));

        let err = service.get_latest(Some(-1)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidRating(-1)));
    }

    #[tokio::test]
    async fn test_get_latest_rating_zero_means_unfiltered() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();
        service.create(2, 2, &draft(3)).await.unwrap();

        let zero = service.get_latest(Some(0)).await.unwrap();
        let unfiltered = service.get_latest(None).await.unwrap();
        assert_eq!(zero.len(), 2);
        assert_eq!(zero, unfiltered);
    }

    #[tokio::test]
    async fn test_get_latest_view_follows_rating_change() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(5)).await.unwrap();

        // Warm the filtered and unfiltered views
        assert_eq!(service.get_latest(Some(5)).await.unwrap().len(), 1);
        assert_eq!(service.get_latest(None).await.unwrap().len(), 1);

        service.update(1, 1, &draft(2)).await.unwrap();

        // Both affected views were evicted and rebuilt from the store
        assert!(service.get_latest(Some(5)).await.unwrap().is_empty());
        let twos = service.get_latest(Some(2)).await.unwrap();
        assert_eq!(twos.len(), 1);
        assert_eq!(service.get_latest(None).await.unwrap()[0].rating, 2);
    }

    #[tokio::test]
    async fn test_get_latest_drops_deleted_feedback() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(4)).await.unwrap();
        assert_eq!(service.get_latest(None).await.unwrap().len(), 1);

        service.delete(1, 1).await.unwrap();
        assert!(service.get_latest(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_latest_attaches_products() {
        let h = harness().await;
        let service = service_from(&h);
        service.create(1, 1, &draft(4)).await.unwrap();

        let list = service.get_latest(None).await.unwrap();
        assert_eq!(list[0].products.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let h = harness().await;
        let service = service_from(&h);

        let err = service.get(99, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::CustomerNotFound(99)));
    }
}
