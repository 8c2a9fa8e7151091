//! Authentication service: register, login, refresh, logout.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use validator::ValidateEmail;

use bazaar_auth::{BindingContext, Claims, PasswordHasher, PasswordValidator, SessionManager, SessionRejection};
use bazaar_cache::CacheManager;
use bazaar_core::config::auth::AuthConfig;
use bazaar_core::error::{AppError, FieldErrors};
use bazaar_core::result::AppResult;
use bazaar_database::store::UserStore;
use bazaar_entity::audit::AuditEventType;
use bazaar_entity::session::TokenPair;
use bazaar_entity::user::{CreateUser, User, UserRole, normalize_email};

use crate::audit::AuditWriter;
use crate::auth::lockout::LoginLockout;

/// Uniform message for every failed credential check.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registration form.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Email address, normalized before use.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Requested role, `BUYER` when absent.
    #[serde(default)]
    pub role: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// The authenticated user.
    pub user: User,
    /// Freshly issued token pair.
    pub tokens: TokenPair,
}

/// Handles the credential and token flows.
#[derive(Debug, Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    policy: PasswordValidator,
    sessions: SessionManager,
    lockout: LoginLockout,
    audit: AuditWriter,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
        cache: CacheManager,
        audit: AuditWriter,
    ) -> AppResult<Self> {
        Ok(Self {
            users,
            hasher: Arc::new(PasswordHasher::new(config)?),
            policy: PasswordValidator::new(config),
            sessions,
            lockout: LoginLockout::new(cache, config),
            audit,
        })
    }

    /// Create an account.
    pub async fn register(&self, input: RegisterInput, client: &BindingContext) -> AppResult<User> {
        let email = normalize_email(&input.email);
        let mut fields = FieldErrors::new();

        if !email.validate_email() {
            fields.insert(
                "email".to_string(),
                vec!["Email must be a valid address".to_string()],
            );
        }

        let violations = self.policy.violations(&input.password);
        if !violations.is_empty() {
            fields.insert("password".to_string(), violations);
        }

        let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            None => Some(UserRole::Buyer),
            Some(raw) => raw.parse::<UserRole>().ok().filter(UserRole::is_self_assignable),
        };
        let Some(role) = role else {
            fields.insert(
                "role".to_string(),
                vec!["Role must be BUYER or SELLER".to_string()],
            );
            return Err(AppError::validation_fields(fields));
        };

        if !fields.is_empty() {
            return Err(AppError::validation_fields(fields));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.hasher.hash(input.password).await?;
        let user = self
            .users
            .create(&CreateUser {
                email,
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "User registered");
        self.audit
            .record(
                AuditEventType::UserRegistered,
                Some(user.id),
                Some(client),
                Some(json!({ "role": user.role })),
            )
            .await;
        Ok(user)
    }

    /// Check credentials and open a session bound to `client`.
    pub async fn login(&self, input: LoginInput, client: &BindingContext) -> AppResult<AuthOutcome> {
        let email = normalize_email(&input.email);

        if self.lockout.is_locked(&email).await? {
            return Err(AppError::rate_limited(
                "Too many failed login attempts",
                self.lockout.duration(),
            ));
        }

        let user = self.users.find_by_email(&email).await?;
        let verified = match &user {
            Some(user) => {
                self.hasher
                    .verify(input.password, user.password_hash.clone())
                    .await?
            }
            None => self.hasher.verify_dummy(input.password).await?,
        };

        let mut user = match user {
            Some(user) if verified => user,
            other => {
                self.record_failure(&email, other.map(|u| u.id), client).await?;
                return Err(AppError::authentication(INVALID_CREDENTIALS));
            }
        };

        self.lockout.clear(&email).await?;
        self.users.update_last_login(user.id).await?;
        user.last_login = Some(Utc::now());

        let tokens = self.sessions.issue(&user, client).await?;
        info!(user_id = %user.id, session_id = %tokens.session_id, "Login succeeded");
        self.audit
            .record(
                AuditEventType::LoginSucceeded,
                Some(user.id),
                Some(client),
                Some(json!({ "sessionId": tokens.session_id })),
            )
            .await;

        Ok(AuthOutcome { user, tokens })
    }

    async fn record_failure(
        &self,
        email: &str,
        user_id: Option<Uuid>,
        client: &BindingContext,
    ) -> AppResult<()> {
        self.audit
            .record(
                AuditEventType::LoginFailed,
                user_id,
                Some(client),
                Some(json!({ "email": email })),
            )
            .await;

        if self.lockout.register_failure(email).await? {
            self.audit
                .record(
                    AuditEventType::AccountLocked,
                    user_id,
                    Some(client),
                    Some(json!({
                        "email": email,
                        "lockedForSeconds": self.lockout.duration().as_secs(),
                    })),
                )
                .await;
        }
        Ok(())
    }

    /// Validate an access token presented by `client`.
    pub async fn authenticate(&self, token: &str, client: &BindingContext) -> AppResult<Claims> {
        match self.sessions.authenticate(token, client).await {
            Ok(claims) => Ok(claims),
            Err(rejection) => Err(self.audit_rejection(rejection, client).await),
        }
    }

    /// Rotate a refresh token into a new pair.
    pub async fn refresh(&self, token: &str, client: &BindingContext) -> AppResult<AuthOutcome> {
        let (user, tokens) = match self.sessions.refresh(token, client).await {
            Ok(rotated) => rotated,
            Err(rejection) => return Err(self.audit_rejection(rejection, client).await),
        };

        self.audit
            .record(
                AuditEventType::TokenRefreshed,
                Some(user.id),
                Some(client),
                Some(json!({ "sessionId": tokens.session_id })),
            )
            .await;
        Ok(AuthOutcome { user, tokens })
    }

    /// End the session behind `claims`.
    pub async fn logout(&self, claims: &Claims, client: &BindingContext) -> AppResult<()> {
        self.sessions.logout(claims).await?;
        self.audit
            .record(
                AuditEventType::Logout,
                Some(claims.sub),
                Some(client),
                Some(json!({ "sessionId": claims.sid })),
            )
            .await;
        Ok(())
    }

    async fn audit_rejection(&self, rejection: SessionRejection, client: &BindingContext) -> AppError {
        match &rejection {
            SessionRejection::Invalid(_) => {}
            SessionRejection::ContextMismatch {
                user_id,
                session_id,
            } => {
                self.audit
                    .record(
                        AuditEventType::SessionContextMismatch,
                        Some(*user_id),
                        Some(client),
                        Some(json!({ "sessionId": session_id })),
                    )
                    .await;
            }
            SessionRejection::RefreshReuse {
                user_id,
                session_id,
                revoked,
            } => {
                warn!(user_id = %user_id, revoked, "Refresh token reuse");
                self.audit
                    .record(
                        AuditEventType::RefreshTokenReused,
                        Some(*user_id),
                        Some(client),
                        Some(json!({ "sessionId": session_id, "revokedTokens": revoked })),
                    )
                    .await;
            }
        }
        rejection.into()
    }
}
