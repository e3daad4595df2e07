//! Request extractors for authentication and path ids.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use libris_auth::{AuthSession, User};
use libris_library::Validator;

use crate::error::GatewayError;
use crate::state::GatewayState;

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn require_bearer(headers: &HeaderMap) -> Result<String, GatewayError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| GatewayError::unauthorized("missing authorization header"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(GatewayError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(GatewayError::unauthorized("missing bearer token"));
    }

    Ok(token.to_string())
}

/// The caller behind a valid bearer session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: AuthSession,
}

#[axum::async_trait]
impl FromRequestParts<Arc<GatewayState>> for CurrentUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState>,
    ) -> Result<Self, Self::Rejection> {
        let token = require_bearer(&parts.headers)?;
        let (user, session) = state.authenticator().authenticate_token(&token).await?;
        Ok(Self { user, session })
    }
}

/// A caller holding the librarian or admin role. Anyone else is rejected with 401.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<Arc<GatewayState>> for AdminUser {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser { user, .. } = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            return Err(GatewayError::unauthorized("admin role required"));
        }
        Ok(Self(user))
    }
}

/// A positive integer `:id` path segment, validated before any handler work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))?;

        let id = Validator::record_id(&raw, "id")?;
        Ok(Self(id))
    }
}
