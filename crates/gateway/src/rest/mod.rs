//! REST API endpoints, mounted under `/api`.

pub mod auth;
pub mod books;
pub mod health;
pub mod loans;
pub mod notifications;
pub mod reservations;
pub mod reviews;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::state::GatewayState;

pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::create_auth_routes())
        .merge(books::create_book_routes())
        .merge(reviews::create_review_routes())
        .merge(reservations::create_reservation_routes())
        .merge(loans::create_loan_routes())
        .merge(notifications::create_notification_routes())
}
