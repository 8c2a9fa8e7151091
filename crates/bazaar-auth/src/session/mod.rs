//! Session lifecycle: issue, authenticate, rotate, revoke.

pub mod manager;

pub use manager::{SessionManager, SessionRejection};
