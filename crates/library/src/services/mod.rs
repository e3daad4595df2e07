//! Domain services

pub mod catalog_service;
pub mod circulation_service;
pub mod notification_service;
pub mod reservation_service;
pub mod review_service;

pub use catalog_service::CatalogService;
pub use circulation_service::CirculationService;
pub use notification_service::NotificationService;
pub use reservation_service::ReservationService;
pub use review_service::ReviewService;
