//! Reservation queue repository.

use sqlx::{SqliteConnection, SqlitePool};

use crate::entities::{
    CancelOutcome, CreateNotificationRequest, Reservation, ReservationStatus, ReservationSummary,
};
use crate::repos::notification_repository::insert_notification;
use crate::time::now_timestamp;
use crate::types::{DatabaseError, DatabaseResult};

const RESERVATION_COLUMNS: &str = "id, user_id, book_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Queue a pending reservation. Fails with `Duplicate` while the user holds an active one.
    pub async fn create(&self, user_id: i64, book_id: i64) -> DatabaseResult<Reservation> {
        let now = now_timestamp();

        let id = sqlx::query(
            "INSERT INTO reservations (user_id, book_id, status, created_at, updated_at)
             VALUES (?, ?, 'pending', ?, ?)",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|error| DatabaseError::from_insert(error, "active reservation for this book"))?
        .last_insert_rowid();

        let mut conn = self.pool.acquire().await?;
        fetch_reservation(&mut conn, id).await
    }

    /// A user's reservations, active ones first. Pending entries carry their queue position.
    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<ReservationSummary>> {
        let reservations = sqlx::query_as::<_, ReservationSummary>(
            "SELECT r.id, r.book_id, b.title AS book_title, r.status, r.created_at,
                CASE WHEN r.status = 'pending' THEN (
                    SELECT COUNT(*) FROM reservations q
                    WHERE q.book_id = r.book_id
                      AND q.status = 'pending'
                      AND (q.created_at < r.created_at OR (q.created_at = r.created_at AND q.id <= r.id))
                ) END AS queue_position
             FROM reservations r
             JOIN books b ON b.id = r.book_id
             WHERE r.user_id = ?
             ORDER BY CASE WHEN r.status IN ('pending', 'ready') THEN 0 ELSE 1 END,
                      r.created_at DESC, r.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Cancel one of the user's reservations. A held copy moves to the next
    /// pending reservation, or back onto the shelf when the queue is empty.
    pub async fn cancel(&self, id: i64, user_id: i64) -> DatabaseResult<CancelOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = now_timestamp();

        // Writing first takes the write lock before anything is read.
        let was_ready = cancel_in_state(&mut tx, id, user_id, ReservationStatus::Ready, &now).await?;
        if !was_ready
            && !cancel_in_state(&mut tx, id, user_id, ReservationStatus::Pending, &now).await?
        {
            let owned = sqlx::query_scalar::<_, i64>(
                "SELECT 1 FROM reservations WHERE id = ? AND user_id = ?",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Ok(match owned {
                Some(_) => CancelOutcome::Inactive,
                None => CancelOutcome::NotFound,
            });
        }

        let reservation = fetch_reservation(&mut tx, id).await?;
        let promoted = if was_ready {
            release_copy(&mut tx, reservation.book_id, &now).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(CancelOutcome::Cancelled {
            reservation,
            promoted,
        })
    }
}

async fn cancel_in_state(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
    current: ReservationStatus,
    now: &str,
) -> DatabaseResult<bool> {
    let result = sqlx::query(
        "UPDATE reservations SET status = 'cancelled', updated_at = ?
         WHERE id = ? AND user_id = ? AND status = ?",
    )
    .bind(now)
    .bind(id)
    .bind(user_id)
    .bind(current)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

async fn fetch_reservation(conn: &mut SqliteConnection, id: i64) -> DatabaseResult<Reservation> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(reservation)
}

async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: ReservationStatus,
    now: &str,
) -> DatabaseResult<Reservation> {
    sqlx::query("UPDATE reservations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    fetch_reservation(conn, id).await
}

/// Hand a freed copy of `book_id` to the oldest pending reservation and notify
/// its holder. With an empty queue the copy goes back to `available_copies`.
pub(crate) async fn release_copy(
    conn: &mut SqliteConnection,
    book_id: i64,
    now: &str,
) -> DatabaseResult<Option<Reservation>> {
    let next = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations
         WHERE book_id = ? AND status = 'pending'
         ORDER BY created_at, id
         LIMIT 1"
    ))
    .bind(book_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(next) = next else {
        sqlx::query(
            "UPDATE books
             SET available_copies = MIN(total_copies, available_copies + 1), updated_at = ?
             WHERE id = ?",
        )
        .bind(now)
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
        return Ok(None);
    };

    let promoted = set_status(&mut *conn, next.id, ReservationStatus::Ready, now).await?;

    let title = sqlx::query_scalar::<_, String>("SELECT title FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await?;
    insert_notification(
        &mut *conn,
        &CreateNotificationRequest::reservation_ready(promoted.user_id, &title),
    )
    .await?;

    Ok(Some(promoted))
}
