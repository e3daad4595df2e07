//! Hold queue management for members.

use sqlx::SqlitePool;
use tracing::info;

use libris_database::{
    BookRepository, CancelOutcome, Reservation, ReservationRepository, ReservationSummary,
};

use crate::services::catalog_service::ensure_book_exists;
use crate::types::{LibraryError, LibraryResult};

#[derive(Clone)]
pub struct ReservationService {
    reservations: ReservationRepository,
    books: BookRepository,
}

impl ReservationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            reservations: ReservationRepository::new(pool.clone()),
            books: BookRepository::new(pool),
        }
    }

    /// Join the queue for a book. Allowed even while copies are on the shelf.
    pub async fn reserve(&self, user_id: i64, book_id: i64) -> LibraryResult<Reservation> {
        ensure_book_exists(&self.books, book_id).await?;

        let reservation = self.reservations.create(user_id, book_id).await?;
        info!(reservation_id = reservation.id, user_id, book_id, "reservation queued");
        Ok(reservation)
    }

    pub async fn list_for_user(&self, user_id: i64) -> LibraryResult<Vec<ReservationSummary>> {
        Ok(self.reservations.list_for_user(user_id).await?)
    }

    pub async fn cancel(&self, user_id: i64, reservation_id: i64) -> LibraryResult<Reservation> {
        match self.reservations.cancel(reservation_id, user_id).await? {
            CancelOutcome::Cancelled {
                reservation,
                promoted,
            } => {
                info!(
                    reservation_id,
                    user_id,
                    promoted = ?promoted.map(|next| next.id),
                    "reservation cancelled"
                );
                Ok(reservation)
            }
            CancelOutcome::Inactive => {
                Err(LibraryError::validation("reservation is no longer active"))
            }
            CancelOutcome::NotFound => Err(LibraryError::not_found("reservation")),
        }
    }
}
