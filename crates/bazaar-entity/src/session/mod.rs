//! Session domain entities.

pub mod model;
pub mod token;

pub use model::{CreateRefreshToken, RefreshTokenRecord};
pub use token::TokenPair;
