//! Computed views returned by the services.

use chrono::{DateTime, Utc};
use serde::Serialize;

use libris_database::{Loan, OverdueLoan, Reservation};

/// An open loan past its due date, with the number of whole days it is late.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueTransaction {
    pub transaction_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub user_id: i64,
    pub user_email: String,
    pub user_display_name: Option<String>,
    pub borrowed_at: String,
    pub due_date: String,
    pub days_overdue: i64,
}

impl OverdueTransaction {
    pub fn from_loan(loan: OverdueLoan, now: DateTime<Utc>) -> Self {
        let days_overdue = loan.days_overdue(now);
        Self {
            transaction_id: loan.transaction_id,
            book_id: loan.book_id,
            book_title: loan.book_title,
            user_id: loan.user_id,
            user_email: loan.user_email,
            user_display_name: loan.user_display_name,
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            days_overdue,
        }
    }
}

/// Result of closing a loan.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnReceipt {
    pub loan: Loan,
    /// Reservation now holding the returned copy, if the queue was not empty.
    pub promoted: Option<Reservation>,
}
