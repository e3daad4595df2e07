//! Book catalog entities

use serde::{Deserialize, Serialize};

/// A catalog entry joined with its author and category names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub published_year: Option<i64>,
    pub description: Option<String>,
    pub total_copies: i64,
}

/// Filters for catalog listing. `search` matches title or author name.
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Copy counters and queue state for a single book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookAvailability {
    pub book_id: i64,
    pub title: String,
    pub total_copies: i64,
    pub available_copies: i64,
    pub active_loans: i64,
    pub queue_length: i64,
    pub next_due_date: Option<String>,
}

impl BookAvailability {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}
