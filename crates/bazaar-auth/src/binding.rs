//! Client binding fingerprint.
//!
//! Every token embeds a fingerprint of the client that logged in. A token
//! replayed from another user agent (or, when IP binding is on, another
//! address) no longer matches and is rejected.

use sha2::{Digest, Sha256};

/// Client attributes a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingContext {
    /// Client address as resolved by the HTTP layer.
    pub ip: String,
    /// Hex SHA-256 of the `User-Agent` header (empty string if absent).
    pub user_agent_hash: String,
}

impl BindingContext {
    /// Build a context from the raw request attributes.
    pub fn new(ip: impl Into<String>, user_agent: Option<&str>) -> Self {
        Self {
            ip: ip.into(),
            user_agent_hash: hash_user_agent(user_agent.unwrap_or_default()),
        }
    }

    /// The value embedded in and compared against the `bfp` claim.
    pub fn fingerprint(&self, bind_ip: bool) -> String {
        if bind_ip {
            sha256_hex(&format!("{}|{}", self.ip, self.user_agent_hash))
        } else {
            self.user_agent_hash.clone()
        }
    }
}

/// Hex SHA-256 of a user agent string.
pub fn hash_user_agent(user_agent: &str) -> String {
    sha256_hex(user_agent)
}

fn sha256_hex(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}
