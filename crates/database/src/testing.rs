//! Fixtures for tests that need a migrated SQLite database.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! the dev-dependencies of downstream crates.

use sqlx::SqlitePool;
use tempfile::TempDir;

use libris_config::DatabaseConfig;

use crate::time::{format_timestamp, now_timestamp};
use crate::{prepare_database, run_migrations};

/// Open a fresh migrated database in a temporary directory.
///
/// The directory must outlive the pool, so callers keep the returned guard.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("libris-test.db");

    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: 4,
    };

    let pool = prepare_database(&config)
        .await
        .expect("failed to open test database");
    run_migrations(&pool)
        .await
        .expect("failed to migrate test database");

    (pool, temp_dir)
}

/// Insert a user row directly and return its id. The password hash is not usable for login.
pub async fn insert_user(pool: &SqlitePool, email: &str, role: &str) -> i64 {
    let now = now_timestamp();
    sqlx::query(
        "INSERT INTO users (public_id, email, display_name, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, 'not-a-hash', ?, ?, ?)",
    )
    .bind(format!("test-{email}"))
    .bind(email)
    .bind(email.split('@').next().unwrap_or(email))
    .bind(role)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("failed to insert test user")
    .last_insert_rowid()
}

/// Insert a book with every copy on the shelf and return its id.
pub async fn insert_book(pool: &SqlitePool, title: &str, copies: i64) -> i64 {
    let now = now_timestamp();
    sqlx::query(
        "INSERT INTO books (title, total_copies, available_copies, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(title)
    .bind(copies)
    .bind(copies)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("failed to insert test book")
    .last_insert_rowid()
}

/// Insert an open loan with the given due date, bypassing copy accounting.
pub async fn insert_open_loan(
    pool: &SqlitePool,
    user_id: i64,
    book_id: i64,
    due_date: chrono::DateTime<chrono::Utc>,
) -> i64 {
    let borrowed_at = due_date - chrono::Duration::days(14);
    sqlx::query(
        "INSERT INTO transactions (user_id, book_id, borrowed_at, due_date, status)
         VALUES (?, ?, ?, ?, 'borrowed')",
    )
    .bind(user_id)
    .bind(book_id)
    .bind(format_timestamp(borrowed_at))
    .bind(format_timestamp(due_date))
    .execute(pool)
    .await
    .expect("failed to insert test loan")
    .last_insert_rowid()
}
