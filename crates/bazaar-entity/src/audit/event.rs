//! Security event types recorded in the audit log.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use bazaar_core::AppError;

/// Kinds of security-relevant events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditEventType {
    /// A new account was created.
    #[serde(rename = "user.registered")]
    UserRegistered,
    /// Credentials were accepted.
    #[serde(rename = "login.succeeded")]
    LoginSucceeded,
    /// Credentials were rejected.
    #[serde(rename = "login.failed")]
    LoginFailed,
    /// Too many failed logins locked the email.
    #[serde(rename = "account.locked")]
    AccountLocked,
    /// The user logged out.
    #[serde(rename = "logout")]
    Logout,
    /// A refresh token was exchanged for a new pair.
    #[serde(rename = "token.refreshed")]
    TokenRefreshed,
    /// A revoked refresh token was presented again.
    #[serde(rename = "refresh_token.reused")]
    RefreshTokenReused,
    /// A token was presented from a different device context.
    #[serde(rename = "session.context_mismatch")]
    SessionContextMismatch,
    /// An admin changed a user's role.
    #[serde(rename = "user.role_changed")]
    RoleChanged,
}

impl AuditEventType {
    /// Every event kind.
    pub const ALL: [Self; 9] = [
        Self::UserRegistered,
        Self::LoginSucceeded,
        Self::LoginFailed,
        Self::AccountLocked,
        Self::Logout,
        Self::TokenRefreshed,
        Self::RefreshTokenReused,
        Self::SessionContextMismatch,
        Self::RoleChanged,
    ];

    /// Stable string stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRegistered => "user.registered",
            Self::LoginSucceeded => "login.succeeded",
            Self::LoginFailed => "login.failed",
            Self::AccountLocked => "account.locked",
            Self::Logout => "logout",
            Self::TokenRefreshed => "token.refreshed",
            Self::RefreshTokenReused => "refresh_token.reused",
            Self::SessionContextMismatch => "session.context_mismatch",
            Self::RoleChanged => "user.role_changed",
        }
    }

    /// Events that indicate a possible attack.
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            Self::LoginFailed
                | Self::AccountLocked
                | Self::RefreshTokenReused
                | Self::SessionContextMismatch
        )
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditEventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == wanted)
            .ok_or_else(|| {
                AppError::validation_field("event", format!("Unknown audit event '{wanted}'"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_as_str() {
        for event in [
            AuditEventType::UserRegistered,
            AuditEventType::AccountLocked,
            AuditEventType::SessionContextMismatch,
        ] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_parse_round_trips_every_event() {
        for event in AuditEventType::ALL {
            assert_eq!(event.as_str().parse::<AuditEventType>().unwrap(), event);
        }
        assert!("login".parse::<AuditEventType>().is_err());
    }

    #[test]
    fn test_alert_events() {
        assert!(AuditEventType::AccountLocked.is_alert());
        assert!(!AuditEventType::LoginSucceeded.is_alert());
    }
}
