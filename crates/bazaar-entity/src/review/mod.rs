//! Product review entities.

pub mod model;

pub use model::{CreateReview, Review};
