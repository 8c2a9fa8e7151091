//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod checkout;
pub mod health;
pub mod product;
pub mod review;
