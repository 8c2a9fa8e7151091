//! # bazaar-auth
//!
//! Authentication building blocks for Bazaar.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and the password policy
//! - `binding`: client fingerprint embedded in every token
//! - `jwt`: access/refresh token signing and validation
//! - `rate_limit`: fixed-window limiter over the shared counter store
//! - `session`: issue, authenticate, rotate, and revoke sessions

pub mod binding;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod session;

pub use binding::BindingContext;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
pub use rate_limit::{ClassUsage, ClientUsage, FixedWindowLimiter, RateLimitDecision, RouteClass};
pub use session::{SessionManager, SessionRejection};
