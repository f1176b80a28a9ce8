//! API route handlers

pub mod feedback;
pub mod health;
