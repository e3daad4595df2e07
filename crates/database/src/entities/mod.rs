//! Domain entities for the database layer

pub mod book;
pub mod catalog;
pub mod loan;
pub mod notification;
pub mod reservation;
pub mod review;

pub use book::{Book, BookAvailability, BookQuery, CreateBookRequest};
pub use catalog::CategorySummary;
pub use loan::{CheckoutOutcome, Loan, LoanStatus, LoanSummary, OverdueLoan, ReturnOutcome};
pub use notification::{CreateNotificationRequest, Notification, NotificationType};
pub use reservation::{CancelOutcome, Reservation, ReservationStatus, ReservationSummary};
pub use review::{CreateReviewRequest, RatingStats, Review};
