//! Libris database crate
//!
//! Connection management, embedded migrations, entities and repositories for
//! the library backend.

use sqlx::SqlitePool;

use libris_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod maintenance;
pub mod migrations;
pub mod repos;
pub mod time;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use connection::{ping, prepare_database};
pub use maintenance::{enable_extensions, ExtensionStatus};
pub use migrations::run_migrations;

pub use repos::{
    BookRepository, LoanRepository, NotificationRepository, ReservationRepository,
    ReviewRepository,
};

pub use entities::{
    Book, BookAvailability, BookQuery, CancelOutcome, CategorySummary, CheckoutOutcome,
    CreateBookRequest, CreateNotificationRequest, CreateReviewRequest, Loan, LoanStatus,
    LoanSummary, Notification, NotificationType, OverdueLoan, RatingStats, Reservation,
    ReservationStatus, ReservationSummary, ReturnOutcome, Review,
};

pub use types::{DatabaseError, DatabaseResult};

/// Open the pool and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("init.db").display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(books, 0);
    }
}
