//! Review entities and rating aggregates

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub user_id: i64,
    pub book_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingStats {
    pub book_id: i64,
    pub total_reviews: i64,
    pub average_rating: f64,
    /// Review count per star value, always holding keys 1 through 5.
    pub distribution: BTreeMap<u8, i64>,
}

impl RatingStats {
    /// Build stats from `(rating, count)` pairs. Ratings outside 1..=5 are ignored.
    pub fn from_counts(book_id: i64, counts: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut distribution: BTreeMap<u8, i64> = (1..=5).map(|star| (star, 0)).collect();
        for (rating, count) in counts {
            if let Ok(star) = u8::try_from(rating) {
                if let Some(slot) = distribution.get_mut(&star) {
                    *slot += count;
                }
            }
        }

        let total_reviews: i64 = distribution.values().sum();
        let weighted: i64 = distribution
            .iter()
            .map(|(star, count)| i64::from(*star) * count)
            .sum();
        let average_rating = if total_reviews == 0 {
            0.0
        } else {
            ((weighted as f64 / total_reviews as f64) * 100.0).round() / 100.0
        };

        Self {
            book_id,
            total_reviews,
            average_rating,
            distribution,
        }
    }
}
