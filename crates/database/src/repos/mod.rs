//! Database repository implementations

pub mod book_repository;
pub mod loan_repository;
pub mod notification_repository;
pub mod reservation_repository;
pub mod review_repository;

pub use book_repository::BookRepository;
pub use loan_repository::LoanRepository;
pub use notification_repository::NotificationRepository;
pub use reservation_repository::ReservationRepository;
pub use review_repository::ReviewRepository;
