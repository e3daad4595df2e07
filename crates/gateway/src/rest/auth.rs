//! Authentication REST endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use libris_auth::{AuthSession, User};

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::CurrentUser;
use crate::rest::notifications::SuccessResponse;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub public_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `member`, `librarian` or `admin`.
    pub role: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            user: user.into(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            public_id: user.public_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role.as_str().to_string(),
        }
    }
}

pub fn create_auth_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> GatewayResult<Json<SessionResponse>> {
    let Json(payload) = payload?;
    let (user, session) = state
        .authenticator()
        .login_with_password(&payload.email, &payload.password)
        .await?;
    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session revoked", body = SuccessResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { session, .. }: CurrentUser,
) -> GatewayResult<Json<SuccessResponse>> {
    state.authenticator().revoke_session(&session.token).await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user information", body = UserResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(CurrentUser { user, .. }: CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
