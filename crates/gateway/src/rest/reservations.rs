//! Reservation queue endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use libris_database::{Reservation, ReservationSummary};

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::{CurrentUser, PathId};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationResponse {
    pub id: i64,
    pub book_id: i64,
    /// `pending`, `ready`, `fulfilled` or `cancelled`.
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            book_id: reservation.book_id,
            status: reservation.status.as_str().to_string(),
            created_at: reservation.created_at,
            updated_at: reservation.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationSummaryResponse {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub status: String,
    /// 1-based place in the queue while pending.
    pub queue_position: Option<i64>,
    pub created_at: String,
}

impl From<ReservationSummary> for ReservationSummaryResponse {
    fn from(summary: ReservationSummary) -> Self {
        Self {
            id: summary.id,
            book_id: summary.book_id,
            book_title: summary.book_title,
            status: summary.status.as_str().to_string(),
            queue_position: summary.queue_position,
            created_at: summary.created_at,
        }
    }
}

pub fn create_reservation_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/books/:id/reservations", post(create_reservation))
        .route("/reservations", get(list_reservations))
        .route("/reservations/:id", delete(cancel_reservation))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/reservations",
    tag = "Reservations",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 201, description = "Joined the queue", body = ReservationResponse),
        (status = 400, description = "Already holding an active reservation", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_reservation(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    PathId(book_id): PathId,
) -> GatewayResult<(StatusCode, Json<ReservationResponse>)> {
    let reservation = state.reservations().reserve(user.id, book_id).await?;
    Ok((StatusCode::CREATED, Json(reservation.into())))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    responses(
        (status = 200, description = "Caller's reservations, active first", body = Vec<ReservationSummaryResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_reservations(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
) -> GatewayResult<Json<Vec<ReservationSummaryResponse>>> {
    let reservations = state.reservations().list_for_user(user.id).await?;
    Ok(Json(
        reservations
            .into_iter()
            .map(ReservationSummaryResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ReservationResponse),
        (status = 400, description = "Reservation no longer active", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "No such reservation for the caller", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn cancel_reservation(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    PathId(reservation_id): PathId,
) -> GatewayResult<Json<ReservationResponse>> {
    let reservation = state.reservations().cancel(user.id, reservation_id).await?;
    Ok(Json(reservation.into()))
}
