//! Feedback route handlers

pub mod order;
pub mod product;
pub mod types;
