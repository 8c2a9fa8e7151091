//! Product catalog entities.

pub mod model;
pub mod price;

pub use model::{CreateProduct, Product, ProductFilter};
pub use price::{format_price, parse_price};
