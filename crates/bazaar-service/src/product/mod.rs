//! Product catalog: listings, images, ownership.

pub mod image;
pub mod service;

pub use image::ImageUpload;
pub use service::{NewListing, ProductService};
