//! PostgreSQL repositories
//!
//! Row types (CustomerRow, FeedbackRow, etc.) should be imported from
//! `crate::data::types`.

pub mod customer;
pub mod feedback;
pub mod order;
pub mod product;

pub use customer::{get_by_username as get_customer_by_username, get_customer};
pub use feedback::{
    create_order_feedback, create_product_feedback, delete_order_feedback,
    delete_product_feedback, get_feedback, list_latest as list_latest_feedback, update_feedback,
};
pub use order::{get_order, get_order_product, list_order_products};
pub use product::{get_product, list_by_ids as list_products_by_ids};
