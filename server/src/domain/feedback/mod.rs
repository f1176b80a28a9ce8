//! Feedback orchestration
//!
//! One service per feedback kind. Both follow the same shape: validate
//! ownership, validate the rating, run the two-row transactional write
//! through the repository, then bring the cache back in line with the
//! store. Cache maintenance happens strictly after commit; the latest
//! views affected by a mutation are evicted and repopulate on next read.

mod order;
mod product;

pub use order::OrderFeedbackService;
pub use product::ProductFeedbackService;

use crate::core::constants::{RATING_MAX, RATING_MIN};
use crate::data::cache::EntityCache;
use crate::data::types::FeedbackRow;

use super::error::DomainError;

/// Client-supplied feedback fields
#[derive(Debug, Clone)]
pub struct FeedbackDraft {
    pub rating: i32,
    pub comment: Option<String>,
}

/// Reject ratings outside the accepted range before anything is written
pub(crate) fn validate_rating(rating: i32) -> Result<(), DomainError> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(DomainError::InvalidRating(rating));
    }
    Ok(())
}

/// Evict the latest-feedback views a mutation could have changed
///
/// Always drops the unfiltered view plus the view for each affected
/// rating; views for other ratings age out through their TTL.
pub(crate) async fn invalidate_latest_views(cache: &EntityCache, ratings: &[i32]) {
    cache
        .remove(&cache.keys().latest_feedback::<FeedbackRow>(None))
        .await;
    for rating in ratings {
        cache
            .remove(&cache.keys().latest_feedback::<FeedbackRow>(Some(*rating)))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(matches!(
            validate_rating(0),
            Err(DomainError::InvalidRating(0))
        ));
        assert!(matches!(
            validate_rating(6),
            Err(DomainError::InvalidRating(6))
        ));
        assert!(matches!(
            validate_rating(-3),
            Err(DomainError::InvalidRating(-3))
        ));
    }
}
