//! Reviews and rating statistics.

use sqlx::SqlitePool;
use tracing::info;

use libris_database::{BookRepository, CreateReviewRequest, RatingStats, Review, ReviewRepository};

use crate::services::catalog_service::ensure_book_exists;
use crate::types::LibraryResult;
use crate::validation::Validator;

#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
    books: BookRepository,
}

impl ReviewService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            reviews: ReviewRepository::new(pool.clone()),
            books: BookRepository::new(pool),
        }
    }

    pub async fn list_reviews(
        &self,
        book_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> LibraryResult<Vec<Review>> {
        ensure_book_exists(&self.books, book_id).await?;
        let (limit, offset) = Validator::page(limit, offset);
        Ok(self.reviews.list_for_book(book_id, limit, offset).await?)
    }

    pub async fn add_review(
        &self,
        user_id: i64,
        book_id: i64,
        rating: i64,
        comment: Option<String>,
    ) -> LibraryResult<Review> {
        let request = CreateReviewRequest {
            user_id,
            book_id,
            rating: Validator::rating(rating)?,
            comment: Validator::comment(comment)?,
        };
        ensure_book_exists(&self.books, book_id).await?;

        let review = self.reviews.create(&request).await?;
        info!(review_id = review.id, book_id, rating, "review added");
        Ok(review)
    }

    /// Count, two-decimal average and per-star distribution for a book.
    pub async fn rating_stats(&self, book_id: i64) -> LibraryResult<RatingStats> {
        ensure_book_exists(&self.books, book_id).await?;
        Ok(self.reviews.rating_stats(book_id).await?)
    }
}
