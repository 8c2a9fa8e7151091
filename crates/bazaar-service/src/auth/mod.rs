//! Registration, login, and token lifecycle flows.

pub mod lockout;
pub mod service;

pub use lockout::LoginLockout;
pub use service::{AuthOutcome, AuthService, LoginInput, RegisterInput};
