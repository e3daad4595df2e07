//! Review repository and rating aggregation.

use sqlx::SqlitePool;

use crate::entities::{CreateReviewRequest, RatingStats, Review};
use crate::time::now_timestamp;
use crate::types::{DatabaseError, DatabaseResult};

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, r.book_id, r.rating, r.comment,
        u.display_name AS reviewer_name, r.created_at
     FROM reviews r
     JOIN users u ON u.id = r.user_id";

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a review. A second review of the same book by the same user is a `Duplicate`.
    pub async fn create(&self, request: &CreateReviewRequest) -> DatabaseResult<Review> {
        let id = sqlx::query(
            "INSERT INTO reviews (user_id, book_id, rating, comment, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(request.user_id)
        .bind(request.book_id)
        .bind(request.rating)
        .bind(&request.comment)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await
        .map_err(|error| DatabaseError::from_insert(error, "review for this book"))?
        .last_insert_rowid();

        let review = sqlx::query_as::<_, Review>(&format!("{REVIEW_SELECT} WHERE r.id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(review)
    }

    pub async fn list_for_book(
        &self,
        book_id: i64,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{REVIEW_SELECT}
             WHERE r.book_id = ?
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT ? OFFSET ?"
        ))
        .bind(book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    pub async fn rating_stats(&self, book_id: i64) -> DatabaseResult<RatingStats> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            "SELECT rating, COUNT(*) FROM reviews WHERE book_id = ? GROUP BY rating",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(RatingStats::from_counts(book_id, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_test_pool, insert_book, insert_user};

    fn review(user_id: i64, book_id: i64, rating: i64) -> CreateReviewRequest {
        CreateReviewRequest {
            user_id,
            book_id,
            rating,
            comment: Some("Worth a reread".to_string()),
        }
    }

    #[tokio::test]
    async fn test_one_review_per_user_and_book() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user = insert_user(&pool, "critic@example.com", "member").await;
        let book = insert_book(&pool, "Dune", 1).await;
        let repo = ReviewRepository::new(pool);

        let created = repo.create(&review(user, book, 4)).await.unwrap();
        assert_eq!(created.reviewer_name.as_deref(), Some("critic"));

        let error = repo.create(&review(user, book, 5)).await.unwrap_err();
        assert!(matches!(error, DatabaseError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rating_stats_distribution_sums_to_total() {
        let (pool, _temp_dir) = create_test_pool().await;
        let book = insert_book(&pool, "Dune", 1).await;
        let repo = ReviewRepository::new(pool.clone());

        for (index, rating) in [5, 5, 4, 2].into_iter().enumerate() {
            let user = insert_user(&pool, &format!("reader{index}@example.com"), "member").await;
            repo.create(&review(user, book, rating)).await.unwrap();
        }

        let stats = repo.rating_stats(book).await.unwrap();
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.distribution.values().sum::<i64>(), stats.total_reviews);
        assert_eq!(stats.distribution[&5], 2);
        assert_eq!(stats.distribution[&3], 0);
        assert_eq!(stats.average_rating, 4.0);

        let listed = repo.list_for_book(book, 10, 0).await.unwrap();
        assert_eq!(listed.len(), 4);
    }

    #[tokio::test]
    async fn test_created_review_is_committed_before_returning() {
        let (pool, _temp_dir) = create_test_pool().await;
        let user = insert_user(&pool, "critic@example.com", "member").await;
        let book = insert_book(&pool, "Dune", 1).await;
        let repo = ReviewRepository::new(pool.clone());

        let created = repo.create(&review(user, book, 4)).await.unwrap();

        // Other pooled connections must both see the row and be able to write.
        let mut other = pool.acquire().await.unwrap();
        let seen: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE id = ?")
            .bind(created.id)
            .fetch_one(&mut *other)
            .await
            .unwrap();
        assert_eq!(seen, 1);
        drop(other);

        let second_user = insert_user(&pool, "second@example.com", "member").await;
        let second = repo.create(&review(second_user, book, 2)).await.unwrap();
        assert_eq!(second.rating, 2);
        assert_eq!(repo.rating_stats(book).await.unwrap().total_reviews, 2);
    }

    #[tokio::test]
    async fn test_rating_stats_for_unreviewed_book() {
        let (pool, _temp_dir) = create_test_pool().await;
        let book = insert_book(&pool, "Dune", 1).await;
        let repo = ReviewRepository::new(pool);

        let stats = repo.rating_stats(book).await.unwrap();
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
    }
}
