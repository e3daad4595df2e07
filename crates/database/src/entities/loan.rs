//! Loan entities. Loans live in the `transactions` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::reservation::Reservation;
use crate::time::parse_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LoanStatus {
    Borrowed,
    Returned,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Returned => "returned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
}

/// A loan joined with the title of the borrowed book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoanSummary {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: LoanStatus,
}

/// An open loan whose due date has passed, with borrower details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OverdueLoan {
    pub transaction_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub user_id: i64,
    pub user_email: String,
    pub user_display_name: Option<String>,
    pub borrowed_at: String,
    pub due_date: String,
}

impl OverdueLoan {
    /// Whole days elapsed since the due date, never negative.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        parse_timestamp(&self.due_date)
            .map(|due| (now - due).num_days().max(0))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    Created(Loan),
    NoCopiesAvailable,
    /// The borrower already holds the configured maximum of open loans.
    LoanLimitReached,
    BookNotFound,
    UserNotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnOutcome {
    /// The loan was closed. `promoted` is the reservation that now holds the copy.
    Returned {
        loan: Loan,
        promoted: Option<Reservation>,
    },
    AlreadyReturned,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn overdue(due_date: &str) -> OverdueLoan {
        OverdueLoan {
            transaction_id: 1,
            book_id: 1,
            book_title: "Dune".to_string(),
            user_id: 1,
            user_email: "reader@example.com".to_string(),
            user_display_name: None,
            borrowed_at: "2024-01-01T00:00:00Z".to_string(),
            due_date: due_date.to_string(),
        }
    }

    #[test]
    fn days_overdue_counts_whole_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 11, 0, 0).unwrap();
        assert_eq!(overdue("2024-01-15T12:00:00Z").days_overdue(now), 4);
        assert_eq!(overdue("2024-01-20T10:00:00Z").days_overdue(now), 0);
    }

    #[test]
    fn days_overdue_is_zero_for_unparseable_dates() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        assert_eq!(overdue("not a date").days_overdue(now), 0);
    }
}
