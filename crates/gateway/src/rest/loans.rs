//! Circulation endpoints: checkout, return, overdue reporting

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use libris_database::{Loan, LoanSummary};
use libris_library::{OverdueTransaction, ReturnReceipt};

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::{AdminUser, CurrentUser, PathId};
use crate::rest::reservations::ReservationResponse;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanResponse {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    /// `borrowed` or `returned`.
    pub status: String,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            book_id: loan.book_id,
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            returned_at: loan.returned_at,
            status: loan.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoanSummaryResponse {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: String,
}

impl From<LoanSummary> for LoanSummaryResponse {
    fn from(loan: LoanSummary) -> Self {
        Self {
            id: loan.id,
            book_id: loan.book_id,
            book_title: loan.book_title,
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            returned_at: loan.returned_at,
            status: loan.status.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnResponse {
    pub loan: LoanResponse,
    /// Reservation now holding the copy, when someone was queued.
    pub promoted_reservation: Option<ReservationResponse>,
}

impl From<ReturnReceipt> for ReturnResponse {
    fn from(receipt: ReturnReceipt) -> Self {
        Self {
            loan: receipt.loan.into(),
            promoted_reservation: receipt.promoted.map(ReservationResponse::from),
        }
    }
}

/// One overdue transaction joined with its book and borrower.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverdueTransactionResponse {
    pub transaction_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub user_id: i64,
    pub user_email: String,
    pub user_display_name: Option<String>,
    pub borrowed_at: String,
    pub due_date: String,
    pub days_overdue: i64,
}

impl From<OverdueTransaction> for OverdueTransactionResponse {
    fn from(entry: OverdueTransaction) -> Self {
        Self {
            transaction_id: entry.transaction_id,
            book_id: entry.book_id,
            book_title: entry.book_title,
            user_id: entry.user_id,
            user_email: entry.user_email,
            user_display_name: entry.user_display_name,
            borrowed_at: entry.borrowed_at,
            due_date: entry.due_date,
            days_overdue: entry.days_overdue,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub user_id: i64,
    pub book_id: i64,
    /// Loan period in days. Defaults to the configured period.
    pub loan_days: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OverdueNoticeResponse {
    pub created: usize,
}

pub fn create_loan_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/loans", get(list_my_loans))
        .route("/admin/loans", post(checkout))
        .route("/admin/loans/:id/return", post(return_loan))
        .route("/admin/overdue", get(list_overdue))
        .route("/admin/overdue/notify", post(notify_overdue))
}

#[utoipa::path(
    get,
    path = "/api/loans",
    tag = "Loans",
    responses(
        (status = 200, description = "Caller's loans, open first", body = Vec<LoanSummaryResponse>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_my_loans(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
) -> GatewayResult<Json<Vec<LoanSummaryResponse>>> {
    let loans = state.circulation().loans_for_user(user.id).await?;
    Ok(Json(loans.into_iter().map(LoanSummaryResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/loans",
    tag = "Loans",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Book lent", body = LoanResponse),
        (status = 400, description = "No copy available or loan limit reached", body = ErrorResponse),
        (status = 401, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Unknown user or book", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn checkout(
    State(state): State<Arc<GatewayState>>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<LoanResponse>)> {
    let Json(payload) = payload?;
    let loan = state
        .circulation()
        .checkout(payload.user_id, payload.book_id, payload.loan_days)
        .await?;
    debug!(admin_id = admin.id, loan_id = loan.id, "checkout recorded");
    Ok((StatusCode::CREATED, Json(loan.into())))
}

#[utoipa::path(
    post,
    path = "/api/admin/loans/{id}/return",
    tag = "Loans",
    params(("id" = i64, Path, description = "Loan id")),
    responses(
        (status = 200, description = "Loan closed", body = ReturnResponse),
        (status = 400, description = "Loan already returned", body = ErrorResponse),
        (status = 401, description = "Admin role required", body = ErrorResponse),
        (status = 404, description = "Unknown loan", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn return_loan(
    State(state): State<Arc<GatewayState>>,
    _admin: AdminUser,
    PathId(loan_id): PathId,
) -> GatewayResult<Json<ReturnResponse>> {
    let receipt = state.circulation().return_loan(loan_id).await?;
    Ok(Json(receipt.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/overdue",
    tag = "Loans",
    responses(
        (status = 200, description = "Overdue transactions, most overdue first", body = Vec<OverdueTransactionResponse>),
        (status = 401, description = "Admin role required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_overdue(
    State(state): State<Arc<GatewayState>>,
    _admin: AdminUser,
) -> GatewayResult<Json<Vec<OverdueTransactionResponse>>> {
    let overdue = state.circulation().overdue_transactions(Utc::now()).await?;
    Ok(Json(
        overdue
            .into_iter()
            .map(OverdueTransactionResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/overdue/notify",
    tag = "Loans",
    responses(
        (status = 200, description = "Overdue notices created", body = OverdueNoticeResponse),
        (status = 401, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn notify_overdue(
    State(state): State<Arc<GatewayState>>,
    _admin: AdminUser,
) -> GatewayResult<Json<OverdueNoticeResponse>> {
    let created = state.circulation().notify_overdue(Utc::now()).await?;
    Ok(Json(OverdueNoticeResponse { created }))
}
