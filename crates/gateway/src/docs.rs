use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::rest::health::health_check,
        crate::rest::auth::login,
        crate::rest::auth::logout,
        crate::rest::auth::me,
        crate::rest::books::list_books,
        crate::rest::books::get_book,
        crate::rest::books::book_availability,
        crate::rest::books::list_categories,
        crate::rest::books::create_book,
        crate::rest::reviews::list_reviews,
        crate::rest::reviews::create_review,
        crate::rest::reviews::rating_stats,
        crate::rest::reservations::create_reservation,
        crate::rest::reservations::list_reservations,
        crate::rest::reservations::cancel_reservation,
        crate::rest::loans::list_my_loans,
        crate::rest::loans::checkout,
        crate::rest::loans::return_loan,
        crate::rest::loans::list_overdue,
        crate::rest::loans::notify_overdue,
        crate::rest::notifications::list_notifications,
        crate::rest::notifications::unread_count,
        crate::rest::notifications::mark_read,
        crate::rest::notifications::mark_all_read,
        crate::rest::notifications::delete_notification
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::rest::health::HealthResponse,
            crate::rest::auth::LoginRequest,
            crate::rest::auth::SessionResponse,
            crate::rest::auth::UserResponse,
            crate::rest::books::BookResponse,
            crate::rest::books::AvailabilityResponse,
            crate::rest::books::CategoryResponse,
            crate::rest::books::CreateBookRequest,
            crate::rest::reviews::ReviewResponse,
            crate::rest::reviews::RatingStatsResponse,
            crate::rest::reviews::CreateReviewRequest,
            crate::rest::reservations::ReservationResponse,
            crate::rest::reservations::ReservationSummaryResponse,
            crate::rest::loans::LoanResponse,
            crate::rest::loans::LoanSummaryResponse,
            crate::rest::loans::ReturnResponse,
            crate::rest::loans::OverdueTransactionResponse,
            crate::rest::loans::CheckoutRequest,
            crate::rest::loans::OverdueNoticeResponse,
            crate::rest::notifications::NotificationResponse,
            crate::rest::notifications::UnreadCountResponse,
            crate::rest::notifications::MarkAllReadResponse,
            crate::rest::notifications::SuccessResponse
        )
    ),
    tags(
        (name = "Health", description = "Service and database liveness"),
        (name = "Auth", description = "Password login and sessions"),
        (name = "Books", description = "Catalog browsing and availability"),
        (name = "Reviews", description = "Book reviews and rating statistics"),
        (name = "Reservations", description = "Hold queue for lent-out books"),
        (name = "Loans", description = "Checkout, return and overdue tracking"),
        (name = "Notifications", description = "User notifications")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("session token".to_string());
        }

        components
            .security_schemes
            .insert("bearerAuth".to_string(), scheme);
    }
}
