//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of marketplace roles.
///
/// Stored as the PostgreSQL enum `user_role` and serialized in upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Browses, buys, and reviews products.
    Buyer,
    /// Lists and manages their own products.
    Seller,
    /// Manages users and moderates listings.
    Admin,
}

impl UserRole {
    /// Return the role as its canonical upper-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "BUYER",
            Self::Seller => "SELLER",
            Self::Admin => "ADMIN",
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Roles a user may pick for themselves at registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Self::Buyer | Self::Seller)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Buyer
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = bazaar_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUYER" => Ok(Self::Buyer),
            "SELLER" => Ok(Self::Seller),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(bazaar_core::AppError::validation_field(
                "role",
                format!("Invalid role '{s}'. Expected one of: BUYER, SELLER, ADMIN"),
            )),
        }
    }
}
