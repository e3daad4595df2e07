//! Circulation repository over the `transactions` table.

use sqlx::{SqliteConnection, SqlitePool};

use crate::entities::{
    CheckoutOutcome, Loan, LoanStatus, LoanSummary, OverdueLoan, Reservation, ReservationStatus,
    ReturnOutcome,
};
use crate::repos::reservation_repository::release_copy;
use crate::time::now_timestamp;
use crate::types::DatabaseResult;

const LOAN_COLUMNS: &str = "id, user_id, book_id, borrowed_at, due_date, returned_at, status";

#[derive(Clone)]
pub struct LoanRepository {
    pool: SqlitePool,
}

impl LoanRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lend a copy of `book_id` to `user_id` until `due_date`.
    ///
    /// A copy held for the borrower by a `ready` reservation is used first and
    /// the reservation becomes `fulfilled`. Otherwise a shelf copy is taken.
    pub async fn checkout(
        &self,
        user_id: i64,
        book_id: i64,
        due_date: &str,
        max_active_loans: i64,
    ) -> DatabaseResult<CheckoutOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = now_timestamp();

        // The guarded decrement runs first so the transaction holds the write
        // lock before it reads. Early returns roll it back.
        let took_shelf_copy = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1, updated_at = ?
             WHERE id = ? AND available_copies > 0
               AND NOT EXISTS (
                   SELECT 1 FROM reservations
                   WHERE user_id = ? AND book_id = books.id AND status = 'ready'
               )",
        )
        .bind(&now)
        .bind(book_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let book_exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !book_exists {
            return Ok(CheckoutOutcome::BookNotFound);
        }

        let user_exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !user_exists {
            return Ok(CheckoutOutcome::UserNotFound);
        }

        if count_open_loans(&mut tx, user_id).await? >= max_active_loans {
            return Ok(CheckoutOutcome::LoanLimitReached);
        }

        let active_reservation = sqlx::query_as::<_, Reservation>(
            "SELECT id, user_id, book_id, status, created_at, updated_at FROM reservations
             WHERE user_id = ? AND book_id = ? AND status IN ('pending', 'ready')",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let holds_copy = active_reservation
            .as_ref()
            .is_some_and(|reservation| reservation.status == ReservationStatus::Ready);
        if !took_shelf_copy && !holds_copy {
            return Ok(CheckoutOutcome::NoCopiesAvailable);
        }

        if let Some(reservation) = active_reservation {
            sqlx::query("UPDATE reservations SET status = 'fulfilled', updated_at = ? WHERE id = ?")
                .bind(&now)
                .bind(reservation.id)
                .execute(&mut *tx)
                .await?;
        }

        let loan_id = sqlx::query(
            "INSERT INTO transactions (user_id, book_id, borrowed_at, due_date, status)
             VALUES (?, ?, ?, ?, 'borrowed')",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(&now)
        .bind(due_date)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let loan = fetch_loan(&mut tx, loan_id).await?;

        tx.commit().await?;
        Ok(CheckoutOutcome::Created(loan))
    }

    /// Close a loan and pass the copy to the reservation queue or the shelf.
    pub async fn return_loan(&self, loan_id: i64) -> DatabaseResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;
        let now = now_timestamp();

        let closed = sqlx::query(
            "UPDATE transactions SET status = ?, returned_at = ?
             WHERE id = ? AND returned_at IS NULL",
        )
        .bind(LoanStatus::Returned)
        .bind(&now)
        .bind(loan_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if closed == 0 {
            let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM transactions WHERE id = ?")
                .bind(loan_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Ok(match exists {
                Some(_) => ReturnOutcome::AlreadyReturned,
                None => ReturnOutcome::NotFound,
            });
        }

        let loan = fetch_loan(&mut tx, loan_id).await?;
        let promoted = release_copy(&mut tx, loan.book_id, &now).await?;

        tx.commit().await?;
        Ok(ReturnOutcome::Returned { loan, promoted })
    }

    /// A borrower's loans, open ones first, then by due date.
    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<LoanSummary>> {
        let loans = sqlx::query_as::<_, LoanSummary>(
            "SELECT t.id, t.book_id, b.title AS book_title, t.borrowed_at, t.due_date,
                    t.returned_at, t.status
             FROM transactions t
             JOIN books b ON b.id = t.book_id
             WHERE t.user_id = ?
             ORDER BY CASE WHEN t.returned_at IS NULL THEN 0 ELSE 1 END, t.due_date, t.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Open loans whose due date is before `now`, most overdue first.
    pub async fn find_overdue(&self, now: &str) -> DatabaseResult<Vec<OverdueLoan>> {
        let loans = sqlx::query_as::<_, OverdueLoan>(
            "SELECT t.id AS transaction_id, t.book_id, b.title AS book_title,
                    u.id AS user_id, u.email AS user_email, u.display_name AS user_display_name,
                    t.borrowed_at, t.due_date
             FROM transactions t
             JOIN books b ON b.id = t.book_id
             JOIN users u ON u.id = t.user_id
             WHERE t.returned_at IS NULL AND t.due_date < ?
             ORDER BY t.due_date ASC, t.id ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}

async fn fetch_loan(conn: &mut SqliteConnection, id: i64) -> DatabaseResult<Loan> {
    let loan = sqlx::query_as::<_, Loan>(&format!(
        "SELECT {LOAN_COLUMNS} FROM transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(loan)
}

async fn count_open_loans(conn: &mut SqliteConnection, user_id: i64) -> DatabaseResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM transactions WHERE user_id = ? AND returned_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(count)
}
