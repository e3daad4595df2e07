//! Catalog endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use libris_database::{Book, BookAvailability, CategorySummary};
use libris_library::{BookFilter, NewBook};

use crate::error::{ErrorResponse, GatewayResult};
use crate::extract::{AdminUser, PathId};
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i64>,
    pub description: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            author: book.author,
            category: book.category,
            published_year: book.published_year,
            description: book.description,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub book_id: i64,
    pub title: String,
    pub total_copies: i64,
    pub available_copies: i64,
    pub is_available: bool,
    /// Copies currently lent out.
    pub active_loans: i64,
    /// Pending and ready reservations.
    pub queue_length: i64,
    /// Earliest due date among open loans.
    pub next_due_date: Option<String>,
}

impl From<BookAvailability> for AvailabilityResponse {
    fn from(availability: BookAvailability) -> Self {
        Self {
            is_available: availability.is_available(),
            book_id: availability.book_id,
            title: availability.title,
            total_copies: availability.total_copies,
            available_copies: availability.available_copies,
            active_loans: availability.active_loans,
            queue_length: availability.queue_length,
            next_due_date: availability.next_due_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub book_count: i64,
}

impl From<CategorySummary> for CategoryResponse {
    fn from(category: CategorySummary) -> Self {
        Self {
            id: category.id,
            name: category.name,
            description: category.description,
            book_count: category.book_count,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub title: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i64>,
    pub description: Option<String>,
    /// Defaults to 1.
    pub total_copies: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListBooksQuery {
    /// Case-insensitive match on title or author.
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn create_book_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/books", get(list_books))
        .route("/books/:id", get(get_book))
        .route("/books/:id/availability", get(book_availability))
        .route("/categories", get(list_categories))
        .route("/admin/books", post(create_book))
}

#[utoipa::path(
    get,
    path = "/api/books",
    tag = "Books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookResponse>),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> GatewayResult<Json<Vec<BookResponse>>> {
    let Query(query) = query?;
    let filter = BookFilter {
        q: query.q,
        category: query.category,
        limit: query.limit,
        offset: query.offset,
    };

    let books = state.catalog().list_books(filter).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "Books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<Arc<GatewayState>>,
    PathId(book_id): PathId,
) -> GatewayResult<Json<BookResponse>> {
    let book = state.catalog().get_book(book_id).await?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}/availability",
    tag = "Books",
    params(("id" = i64, Path, description = "Book id")),
    responses(
        (status = 200, description = "Copy counts and queue state", body = AvailabilityResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Unknown book", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn book_availability(
    State(state): State<Arc<GatewayState>>,
    PathId(book_id): PathId,
) -> GatewayResult<Json<AvailabilityResponse>> {
    let availability = state.catalog().availability(book_id).await?;
    Ok(Json(availability.into()))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Books",
    responses(
        (status = 200, description = "Categories with book counts", body = Vec<CategoryResponse>)
    )
)]
pub async fn list_categories(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<Vec<CategoryResponse>>> {
    let categories = state.catalog().list_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admin/books",
    tag = "Books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid book", body = ErrorResponse),
        (status = 401, description = "Librarian or admin role required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_book(
    State(state): State<Arc<GatewayState>>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> GatewayResult<(StatusCode, Json<BookResponse>)> {
    let Json(payload) = payload?;

    let book = state
        .catalog()
        .create_book(NewBook {
            title: payload.title,
            isbn: payload.isbn,
            author: payload.author,
            category: payload.category,
            published_year: payload.published_year,
            description: payload.description,
            total_copies: payload.total_copies,
        })
        .await?;

    info!(admin = %admin.public_id, book_id = book.id, "catalog entry created");
    Ok((StatusCode::CREATED, Json(book.into())))
}
