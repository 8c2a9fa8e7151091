//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use bazaar_core::config::auth::AuthConfig;
use bazaar_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Verifies signature, algorithm, expiry and token type.
///
/// Revocation and binding are checked by the session manager.
#[derive(Clone)]
pub struct JwtDecoder {
    access_key: DecodingKey,
    refresh_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "jti"]);

        Self {
            access_key: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
        }
    }

    /// Decode an access token.
    pub fn decode_access(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, TokenType::Access)
    }

    /// Decode a refresh token.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token, TokenType::Refresh)
    }

    fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let key = match expected {
            TokenType::Access => &self.access_key,
            TokenType::Refresh => &self.refresh_key,
        };

        let claims = decode::<Claims>(token, key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                JwtErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication("Invalid token"),
            })?
            .claims;

        if claims.typ != expected {
            return Err(AppError::authentication("Invalid token type"));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use bazaar_core::error::ErrorKind;
    use bazaar_entity::user::UserRole;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config() -> AuthConfig {
        AuthConfig {
            access_secret: "a".repeat(40),
            refresh_secret: "r".repeat(40),
            ..Default::default()
        }
    }

    #[test]
    fn test_pair_round_trip() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let user = Uuid::new_v4();
        let sid = Uuid::new_v4();

        let pair = encoder.issue_pair(user, UserRole::Seller, sid, "fp").unwrap();
        let access = decoder.decode_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user);
        assert_eq!(access.sid, sid);
        assert_eq!(access.role, UserRole::Seller);
        assert_eq!(access.bfp, "fp");
        assert_eq!(access.jti, pair.access_jti);

        let refresh = decoder.decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.jti, pair.refresh_jti);
        assert!(pair.refresh_expires_at > pair.access_expires_at);
    }

    #[test]
    fn test_tokens_not_interchangeable() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let pair = encoder
            .issue_pair(Uuid::new_v4(), UserRole::Buyer, Uuid::new_v4(), "fp")
            .unwrap();

        assert!(decoder.decode_access(&pair.refresh_token).is_err());
        assert!(decoder.decode_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            sid: Uuid::new_v4(),
            role: UserRole::Buyer,
            bfp: "fp".to_string(),
            iat: now - 120,
            exp: now - 60,
            jti: Uuid::new_v4(),
            typ: TokenType::Access,
        };
        let token = encoder.sign(&claims).unwrap();

        let err = decoder.decode_access(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let encoder = JwtEncoder::new(&AuthConfig {
            access_secret: "x".repeat(40),
            ..config()
        });
        let decoder = JwtDecoder::new(&config());
        let pair = encoder
            .issue_pair(Uuid::new_v4(), UserRole::Buyer, Uuid::new_v4(), "fp")
            .unwrap();
        assert!(decoder.decode_access(&pair.access_token).is_err());
        assert!(decoder.decode_access("not.a.jwt").is_err());
    }

    #[test]
    fn test_oversized_ttls_are_capped() {
        let config = AuthConfig {
            access_ttl_minutes: u64::MAX,
            refresh_ttl_days: u64::MAX,
            ..config()
        };
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);
        let pair = encoder
            .issue_pair(Uuid::new_v4(), UserRole::Buyer, Uuid::new_v4(), "fp")
            .unwrap();

        let access = decoder.decode_access(&pair.access_token).unwrap();
        assert_eq!(access.exp - access.iat, 24 * 3600);
        let refresh = decoder.decode_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 365 * 24 * 3600);
    }
}
