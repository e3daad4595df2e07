//! Review endpoints and rating statistics

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use libris_database::{RatingStats, Review};

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::{CurrentUser, PathId};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub reviewer_name: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            book_id: review.book_id,
            user_id: review.user_id,
            reviewer_name: review.reviewer_name,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingStatsResponse {
    pub book_id: i64,
    pub total_reviews: i64,
    /// Rounded to two decimals, `0.0` without reviews.
    pub average_rating: f64,
    /// Review count keyed by star value `"1"` to `"5"`.
    pub distribution: BTreeMap<String, i64>,
}

impl From<RatingStats> for RatingStatsResponse {
    fn from(stats: RatingStats) -> Self {
        Self {
            book_id: stats.book_id,
            total_reviews: stats.total_reviews,
            average_rating: stats.average_rating,
            distribution: stats
                .distribution
                .into_iter()
                .map(|(star, count)| (star.to_string(), count))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Whole stars, 1 to 5.
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListReviewsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn create_review_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/books/:id/reviews", get(list_reviews).post(create_review))
        .route("/books/:id/reviews/stats", get(rating_stats))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/reviews",
    tag = "Reviews",
    params(("id" = i64, Path, description = "Book id"), ListReviewsQuery),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<ReviewResponse>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse)
    )
)]
pub async fn list_reviews(
    State(state): State<Arc<GatewayState>>,
    PathId(book_id): PathId,
    query: Result<Query<ListReviewsQuery>, QueryRejection>,
) -> GatewayResult<Json<Vec<ReviewResponse>>> {
    let Query(query) = query?;
    let reviews = state
        .reviews()
        .list_reviews(book_id, query.limit, query.offset)
        .await?;
    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/reviews",
    tag = "Reviews",
    params(("id" = i64, Path, description = "Book id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewResponse),
        (status = 400, description = "Invalid rating or duplicate review", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_review(
    State(state): State<Arc<GatewayState>>,
    CurrentUser { user, .. }: CurrentUser,
    PathId(book_id): PathId,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<ReviewResponse>)> {
    let Json(payload) = payload?;
    let review = state
        .reviews()
        .add_review(user.id, book_id, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/reviews/stats",
    tag = "Reviews",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Rating count, average and distribution", body = RatingStatsResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn rating_stats(
    State(state): State<Arc<GatewayState>>,
    PathId(book_id): PathId,
) -> GatewayResult<Json<RatingStatsResponse>> {
    let stats = state.reviews().rating_stats(book_id).await?;
    Ok(Json(stats.into()))
}
