//! Shared application state for the gateway

use sqlx::SqlitePool;

use libris_auth::Authenticator;
use libris_config::AppConfig;
use libris_library::{
    CatalogService, CirculationService, LibraryServices, NotificationService, ReservationService,
    ReviewService,
};

/// Everything a handler needs, shared behind an `Arc` by the router.
#[derive(Clone)]
pub struct GatewayState {
    pool: SqlitePool,
    authenticator: Authenticator,
    library: LibraryServices,
}

impl GatewayState {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, library: LibraryServices) -> Self {
        Self {
            pool,
            authenticator,
            library,
        }
    }

    /// Build every service over `pool` using the loaded configuration.
    pub fn from_config(pool: SqlitePool, config: &AppConfig) -> Self {
        let authenticator = Authenticator::new(pool.clone(), &config.auth);
        let library = LibraryServices::new(pool.clone(), config.library.clone());
        Self::new(pool, authenticator, library)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.library.catalog
    }

    pub fn circulation(&self) -> &CirculationService {
        &self.library.circulation
    }

    pub fn reservations(&self) -> &ReservationService {
        &self.library.reservations
    }

    pub fn reviews(&self) -> &ReviewService {
        &self.library.reviews
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.library.notifications
    }
}
