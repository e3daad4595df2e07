//! Catalog repository: books, authors and categories.

use sqlx::{SqliteConnection, SqlitePool};

use crate::entities::{Book, BookAvailability, BookQuery, CategorySummary, CreateBookRequest};
use crate::time::now_timestamp;
use crate::types::{DatabaseError, DatabaseResult};

const BOOK_SELECT: &str = "SELECT b.id, b.title, b.isbn, a.name AS author, c.name AS category,
        b.published_year, b.description, b.total_copies, b.available_copies,
        b.created_at, b.updated_at
     FROM books b
     LEFT JOIN authors a ON a.id = b.author_id
     LEFT JOIN categories c ON c.id = b.category_id";

#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a book, creating its author and category on demand.
    pub async fn create(&self, request: &CreateBookRequest) -> DatabaseResult<Book> {
        let mut tx = self.pool.begin().await?;
        let now = now_timestamp();

        let author_id = match request.author.as_deref() {
            Some(name) => Some(upsert_author(&mut tx, name, &now).await?),
            None => None,
        };
        let category_id = match request.category.as_deref() {
            Some(name) => Some(upsert_category(&mut tx, name).await?),
            None => None,
        };

        let id = sqlx::query(
            "INSERT INTO books (title, isbn, author_id, category_id, published_year, description,
                                total_copies, available_copies, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.title)
        .bind(&request.isbn)
        .bind(author_id)
        .bind(category_id)
        .bind(request.published_year)
        .bind(&request.description)
        .bind(request.total_copies)
        .bind(request.total_copies)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|error| DatabaseError::from_insert(error, "book with this ISBN"))?
        .last_insert_rowid();

        let book = sqlx::query_as::<_, Book>(&format!("{BOOK_SELECT} WHERE b.id = ?"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(book)
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("{BOOK_SELECT} WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    pub async fn exists(&self, id: i64) -> DatabaseResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// List books ordered by title. Search is a literal substring match on title
    /// or author; SQLite's `LOWER` only folds ASCII, so case is ignored for ASCII
    /// letters and other characters must match exactly.
    pub async fn search(&self, query: &BookQuery) -> DatabaseResult<Vec<Book>> {
        let pattern = query.search.as_deref().map(contains_pattern);

        let books = sqlx::query_as::<_, Book>(&format!(
            "{BOOK_SELECT}
             WHERE (?1 IS NULL
                    OR LOWER(b.title) LIKE ?1 ESCAPE '\\'
                    OR LOWER(COALESCE(a.name, '')) LIKE ?1 ESCAPE '\\')
               AND (?2 IS NULL OR LOWER(c.name) = LOWER(?2))
             ORDER BY b.title COLLATE NOCASE, b.id
             LIMIT ?3 OFFSET ?4"
        ))
        .bind(pattern)
        .bind(&query.category)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Copy counters, active loans, queue length and the earliest open due date.
    pub async fn availability(&self, book_id: i64) -> DatabaseResult<Option<BookAvailability>> {
        let availability = sqlx::query_as::<_, BookAvailability>(
            "SELECT b.id AS book_id, b.title, b.total_copies, b.available_copies,
                (SELECT COUNT(*) FROM transactions t
                  WHERE t.book_id = b.id AND t.returned_at IS NULL) AS active_loans,
                (SELECT COUNT(*) FROM reservations r
                  WHERE r.book_id = b.id AND r.status IN ('pending', 'ready')) AS queue_length,
                (SELECT MIN(t.due_date) FROM transactions t
                  WHERE t.book_id = b.id AND t.returned_at IS NULL) AS next_due_date
             FROM books b
             WHERE b.id = ?",
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(availability)
    }

    pub async fn list_categories(&self) -> DatabaseResult<Vec<CategorySummary>> {
        let categories = sqlx::query_as::<_, CategorySummary>(
            "SELECT c.id, c.name, c.description, COUNT(b.id) AS book_count
             FROM categories c
             LEFT JOIN books b ON b.category_id = c.id
             GROUP BY c.id, c.name, c.description
             ORDER BY c.name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

/// `%term%` with LIKE wildcards in `term` escaped, folded the same way as `LOWER`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

async fn upsert_author(conn: &mut SqliteConnection, name: &str, now: &str) -> DatabaseResult<i64> {
    sqlx::query("INSERT INTO authors (name, created_at) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM authors WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}

async fn upsert_category(conn: &mut SqliteConnection, name: &str) -> DatabaseResult<i64> {
    sqlx::query("INSERT INTO categories (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut *conn)
        .await?;

    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE name = ?")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(id)
}
