//! # Libris library crate
//!
//! Business rules for the library backend, layered over the repositories in
//! `libris-database`:
//!
//! - **Catalog**: book listing, creation and availability
//! - **Circulation**: checkout, return and overdue tracking
//! - **Reservations**: the per-book hold queue
//! - **Reviews**: ratings and their aggregate statistics
//! - **Notifications**: per-user inbox management
//!
//! Every service is cheap to clone and shares the pool it was built from.

use sqlx::SqlitePool;

use libris_config::LibraryConfig;

pub mod services;
pub mod types;
pub mod validation;

pub use services::{
    CatalogService, CirculationService, NotificationService, ReservationService, ReviewService,
};
pub use types::{
    BookFilter, LibraryError, LibraryResult, NewBook, OverdueTransaction, ReturnReceipt,
};
pub use validation::Validator;

/// All domain services built over one pool.
#[derive(Clone)]
pub struct LibraryServices {
    pub catalog: CatalogService,
    pub circulation: CirculationService,
    pub reservations: ReservationService,
    pub reviews: ReviewService,
    pub notifications: NotificationService,
}

impl LibraryServices {
    pub fn new(pool: SqlitePool, config: LibraryConfig) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            circulation: CirculationService::new(pool.clone(), config),
            reservations: ReservationService::new(pool.clone()),
            reviews: ReviewService::new(pool.clone()),
            notifications: NotificationService::new(pool),
        }
    }
}
