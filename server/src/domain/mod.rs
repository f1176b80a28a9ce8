//! Domain layer
//!
//! Business rules between the HTTP surface and the data layer. Lookups
//! are cache-aside readers over the repository; the feedback services
//! own every mutation and keep the cache coherent with the store.

pub mod error;
pub mod feedback;
pub mod lookup;

pub use error::DomainError;
pub use feedback::{FeedbackDraft, OrderFeedbackService, ProductFeedbackService};
pub use lookup::{CustomerLookup, OrderLookup, ProductLookup};
