//! Notification inbox endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use libris_database::Notification;

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::{CurrentUser, PathId};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
            updated_at: notification.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub success: bool,
    /// Notifications that changed from unread to read.
    pub updated_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

pub fn create_notification_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/mark-all-read", post(mark_all_read))
        .route("/notifications/:id/read", post(mark_read))
        .route("/notifications/:id", axum::routing::delete(delete_notification))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = Vec<NotificationResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_notifications(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    query: Result<Query<ListNotificationsQuery>, QueryRejection>,
) -> GatewayResult<Json<Vec<NotificationResponse>>> {
    let Query(query) = query?;
    let notifications = state
        .notifications()
        .list(user.id, query.unread_only, query.limit, query.offset)
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    tag = "Notifications",
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCountResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn unread_count(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
) -> GatewayResult<Json<UnreadCountResponse>> {
    let unread_count = state.notifications().unread_count(user.id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No such notification for the caller", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn mark_read(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    PathId(notification_id): PathId,
) -> GatewayResult<Json<SuccessResponse>> {
    state
        .notifications()
        .mark_read(user.id, notification_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/mark-all-read",
    tag = "Notifications",
    responses(
        (status = 200, description = "All notifications marked read", body = MarkAllReadResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn mark_all_read(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
) -> GatewayResult<Json<MarkAllReadResponse>> {
    let updated_count = state.notifications().mark_all_read(user.id).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        updated_count,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted", body = SuccessResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No such notification for the caller", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_notification(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    PathId(notification_id): PathId,
) -> GatewayResult<Json<SuccessResponse>> {
    state
        .notifications()
        .delete(user.id, notification_id)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}
