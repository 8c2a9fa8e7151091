//! `AuthUser` extractor: pulls the bearer token, validates it against the
//! calling client, and injects the request context.

use std::ops::Deref;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use bazaar_auth::Claims;
use bazaar_core::error::AppError;
use bazaar_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::client::ClientContext;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity and client of the caller.
    pub ctx: RequestContext,
    /// The validated access token claims.
    pub claims: Claims,
}

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.ctx
    }
}

impl Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            <TypedHeader<Authorization<Bearer>> as FromRequestParts<AppState>>::from_request_parts(
                parts, state,
            )
            .await
            .map_err(|_| AppError::authentication("Missing or malformed bearer token"))?;

        let Ok(ClientContext(client)) = ClientContext::from_request_parts(parts, state).await;
        let claims = state.auth.authenticate(bearer.token(), &client).await?;

        Ok(Self {
            ctx: RequestContext::from_claims(&claims, client),
            claims,
        })
    }
}

/// Anonymous when no `Authorization` header is sent; a header that is
/// present must still carry a valid token.
impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }
        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}
