//! # Libris Gateway
//!
//! HTTP layer of the Libris library backend. Routes JSON requests to the
//! domain services in `libris-library` and resolves bearer sessions through
//! `libris-auth`.
//!
//! - **REST**: endpoints under `/api`, documented with OpenAPI
//! - **State**: shared services behind an `Arc`
//! - **Extractors**: authenticated callers, staff callers and validated path ids
//! - **Middleware**: CORS, tracing spans and request logging
//!
//! ```rust,no_run
//! use libris_gateway::{create_router, GatewayState};
//!
//! # async fn run(pool: sqlx::SqlitePool, config: libris_config::AppConfig) -> std::io::Result<()> {
//! let app = create_router(GatewayState::from_config(pool, &config));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:7070").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod docs;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod state;

pub use docs::ApiDoc;
pub use error::{ErrorResponse, GatewayError, GatewayResult};
pub use extract::{AdminUser, CurrentUser, PathId};
pub use state::GatewayState;

use std::sync::Arc;

use axum::{middleware as axum_middleware, routing::get, Router};

/// Build the application router: `/health`, the REST API under `/api`, and
/// Swagger UI in debug builds.
pub fn create_router(state: GatewayState) -> Router {
    let state = Arc::new(state);

    #[allow(unused_mut)]
    let mut router = Router::new()
        .route("/health", get(rest::health::health_check))
        .nest("/api", rest::create_rest_routes())
        .with_state(state);

    #[cfg(debug_assertions)]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(middleware::create_cors_middleware())
        .layer(middleware::create_trace_middleware())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
