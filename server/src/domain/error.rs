//! Domain error taxonomy
//!
//! Validation outcomes (not-found, ownership, duplicate rating, rating
//! bounds) are deterministic and never retried; their messages go to the
//! caller verbatim. `Data` wraps infrastructure failures from the store,
//! which propagate unmodified after the transaction rolls back.

use thiserror::Error;

use crate::data::DataError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unable to retrieve customer with id {0}")]
    CustomerNotFound(i64),

    #[error("Unable to retrieve order with orderId {0}")]
    OrderNotFound(i64),

    #[error("Unable to retrieve product with id {0}")]
    ProductNotFound(i64),

    /// The order has no line rows at all
    #[error("Unable to retrieve products associated to orderId {0}")]
    OrderProductsNotFound(i64),

    /// Line rows exist but none of their products resolved
    #[error("Unable to retrieve product details for orderId {0}")]
    OrderProductsUnresolved(i64),

    #[error("Order {order_id} does not contain product {product_id}")]
    OrderProductNotFound { order_id: i64, product_id: i64 },

    #[error("Order with Id {0} has not been rated. There is no feedback to retrieve.")]
    OrderNotRated(i64),

    #[error("Product {product_id} in order {order_id} has not been rated. There is no feedback to retrieve.")]
    ProductNotRated { order_id: i64, product_id: i64 },

    #[error(
        "The order you are trying to rate has already been rated. Try modifying its feedback instead."
    )]
    OrderAlreadyRated,

    #[error(
        "The product you are trying to rate has already been rated. Try modifying its feedback instead."
    )]
    ProductAlreadyRated,

    #[error("Customer {customer_id} does not own an order with Id {order_id}")]
    OrderNotOwned { customer_id: i64, order_id: i64 },

    #[error("Invalid rating. The rating must be between 1 to 5.")]
    InvalidRating(i32),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl DomainError {
    /// Whether this error means "the thing does not exist"
    ///
    /// The create path probes for existing feedback by running the full get
    /// path and collapses its not-found outcomes into "nothing to conflict
    /// with"; every other error keeps propagating.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CustomerNotFound(_)
                | Self::OrderNotFound(_)
                | Self::ProductNotFound(_)
                | Self::OrderProductsNotFound(_)
                | Self::OrderProductsUnresolved(_)
                | Self::OrderProductNotFound { .. }
                | Self::OrderNotRated(_)
                | Self::ProductNotRated { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_descriptive() {
        assert_eq!(
            DomainError::OrderNotOwned {
                customer_id: 2,
                order_id: 5
            }
            .to_string(),
            "Customer 2 does not own an order with Id 5"
        );
        assert_eq!(
            DomainError::InvalidRating(7).to_string(),
            "Invalid rating. The rating must be between 1 to 5."
        );
        assert_eq!(
            DomainError::OrderNotRated(5).to_string(),
            "Order with Id 5 has not been rated. There is no feedback to retrieve."
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::OrderNotRated(1).is_not_found());
        assert!(
            DomainError::ProductNotRated {
                order_id: 1,
                product_id: 2
            }
            .is_not_found()
        );
        assert!(!DomainError::OrderAlreadyRated.is_not_found());
        assert!(!DomainError::InvalidRating(0).is_not_found());
        assert!(!DomainError::Data(DataError::Conflict("taken".into())).is_not_found());
    }
}
