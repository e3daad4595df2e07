//! Checkout, return and overdue tracking.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use libris_config::LibraryConfig;
use libris_database::time::format_timestamp;
use libris_database::{
    CheckoutOutcome, CreateNotificationRequest, Loan, LoanRepository, LoanSummary,
    NotificationRepository, ReturnOutcome,
};

use crate::types::{LibraryError, LibraryResult, OverdueTransaction, ReturnReceipt};
use crate::validation::Validator;

#[derive(Clone)]
pub struct CirculationService {
    loans: LoanRepository,
    notifications: NotificationRepository,
    config: LibraryConfig,
}

impl CirculationService {
    pub fn new(pool: SqlitePool, config: LibraryConfig) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
            config,
        }
    }

    /// Lend a book. `loan_days` falls back to the configured loan period.
    pub async fn checkout(
        &self,
        user_id: i64,
        book_id: i64,
        loan_days: Option<u32>,
    ) -> LibraryResult<Loan> {
        let days = Validator::loan_days(loan_days.unwrap_or(self.config.loan_days))?;
        let due_date = format_timestamp(Utc::now() + Duration::days(i64::from(days)));
        let max_loans = i64::from(self.config.max_active_loans);

        match self.loans.checkout(user_id, book_id, &due_date, max_loans).await? {
            CheckoutOutcome::Created(loan) => {
                info!(loan_id = loan.id, user_id, book_id, due_date = %loan.due_date, "book checked out");
                Ok(loan)
            }
            CheckoutOutcome::NoCopiesAvailable => {
                Err(LibraryError::validation("no copies available"))
            }
            CheckoutOutcome::LoanLimitReached => Err(LibraryError::validation(format!(
                "borrower already has {max_loans} open loans"
            ))),
            CheckoutOutcome::BookNotFound => Err(LibraryError::not_found("book")),
            CheckoutOutcome::UserNotFound => Err(LibraryError::not_found("user")),
        }
    }

    /// Close a loan. The copy goes to the next pending reservation, if any.
    pub async fn return_loan(&self, loan_id: i64) -> LibraryResult<ReturnReceipt> {
        match self.loans.return_loan(loan_id).await? {
            ReturnOutcome::Returned { loan, promoted } => {
                match &promoted {
                    Some(reservation) => info!(
                        loan_id,
                        book_id = loan.book_id,
                        reservation_id = reservation.id,
                        "book returned and held for next reservation"
                    ),
                    None => info!(loan_id, book_id = loan.book_id, "book returned to shelf"),
                }
                Ok(ReturnReceipt { loan, promoted })
            }
            ReturnOutcome::AlreadyReturned => {
                Err(LibraryError::validation("loan has already been returned"))
            }
            ReturnOutcome::NotFound => Err(LibraryError::not_found("loan")),
        }
    }

    pub async fn loans_for_user(&self, user_id: i64) -> LibraryResult<Vec<LoanSummary>> {
        Ok(self.loans.list_for_user(user_id).await?)
    }

    /// Open loans past their due date at `now`, most overdue first.
    pub async fn overdue_transactions(
        &self,
        now: DateTime<Utc>,
    ) -> LibraryResult<Vec<OverdueTransaction>> {
        let loans = self.loans.find_overdue(&format_timestamp(now)).await?;
        Ok(loans
            .into_iter()
            .map(|loan| OverdueTransaction::from_loan(loan, now))
            .collect())
    }

    /// Send one overdue notice per overdue loan. Notices are stored in a single
    /// transaction, so a failed run leaves nothing behind and can be retried.
    pub async fn notify_overdue(&self, now: DateTime<Utc>) -> LibraryResult<usize> {
        let overdue = self.overdue_transactions(now).await?;
        let requests: Vec<CreateNotificationRequest> = overdue
            .iter()
            .map(|entry| {
                CreateNotificationRequest::overdue(
                    entry.user_id,
                    &entry.book_title,
                    &entry.due_date,
                    entry.days_overdue,
                )
            })
            .collect();

        let created = self
            .notifications
            .create_batch(&requests)
            .await
            .map_err(|err| {
                warn!(overdue = overdue.len(), error = %err, "overdue notice run failed");
                LibraryError::from(err)
            })?
            .len();

        info!(overdue = overdue.len(), created, "overdue notices sent");
        Ok(created)
    }
}
