use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use libris_auth::{NewUser, UserRole};
use libris_config::AppConfig;
use libris_gateway::{create_router, GatewayState};
use libris_runtime::BackendServices;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "a long enough password";

struct TestApp {
    router: Router,
    services: BackendServices,
    _db_dir: TempDir,
}

struct TestResponse {
    status: StatusCode,
    body: Value,
}

impl TestApp {
    async fn new() -> Self {
        let db_dir = TempDir::new().expect("create temp dir");
        let db_path = db_dir.path().join("libris-e2e.db");

        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.to_string_lossy());
        config.database.max_connections = 5;

        let services = BackendServices::initialise(&config)
            .await
            .expect("initialise backend services");

        let state = GatewayState::new(
            services.db_pool.clone(),
            services.authenticator.clone(),
            services.library.clone(),
        );

        Self {
            router: create_router(state),
            services,
            _db_dir: db_dir,
        }
    }

    async fn account(&self, email: &str, role: UserRole) -> (i64, String) {
        let user = self
            .services
            .authenticator
            .register_with_password(NewUser {
                email,
                password: PASSWORD,
                display_name: None,
                role,
            })
            .await
            .expect("register account");

        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);

        let token = response.body["token"]
            .as_str()
            .expect("login returns a token")
            .to_string();
        (user.id, token)
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let app = self.router.clone();
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = if let Some(json_body) = body {
            let bytes = serde_json::to_vec(&json_body).expect("serialize request body");
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(bytes)
        } else {
            Body::empty()
        };

        let response = app
            .oneshot(builder.body(body).expect("build request"))
            .await
            .expect("execute request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read response body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is json")
        };

        TestResponse { status, body }
    }
}

#[tokio::test]
async fn circulation_flow_from_catalog_to_overdue_notice() {
    let app = TestApp::new().await;
    let (_, desk) = app.account("desk@example.com", UserRole::Librarian).await;
    let (reader, reader_token) = app.account("reader@example.com", UserRole::Member).await;

    let book = app
        .request(
            Method::POST,
            "/api/admin/books",
            Some(json!({ "title": "Kindred", "author": "Octavia E. Butler", "total_copies": 1 })),
            Some(&desk),
        )
        .await;
    assert_eq!(book.status, StatusCode::CREATED);
    let book_id = book.body["id"].as_i64().expect("book id");

    let loan = app
        .request(
            Method::POST,
            "/api/admin/loans",
            Some(json!({ "user_id": reader, "book_id": book_id, "loan_days": 7 })),
            Some(&desk),
        )
        .await;
    assert_eq!(loan.status, StatusCode::CREATED);

    let availability = app
        .request(
            Method::GET,
            &format!("/api/books/{book_id}/availability"),
            None,
            None,
        )
        .await;
    assert_eq!(availability.body["is_available"], false);

    let overdue = app
        .request(Method::GET, "/api/admin/overdue", None, Some(&desk))
        .await;
    assert_eq!(overdue.status, StatusCode::OK);
    assert_eq!(overdue.body, json!([]));

    let created = app
        .services
        .library
        .circulation
        .notify_overdue(Utc::now() + Duration::days(10))
        .await
        .expect("send overdue notices");
    assert_eq!(created, 1);

    let unread = app
        .request(
            Method::GET,
            "/api/notifications/unread-count",
            None,
            Some(&reader_token),
        )
        .await;
    assert_eq!(unread.body["unread_count"], 1);

    let marked = app
        .request(
            Method::POST,
            "/api/notifications/mark-all-read",
            None,
            Some(&reader_token),
        )
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.body["updated_count"], 1);

    let loans = app
        .request(Method::GET, "/api/loans", None, Some(&reader_token))
        .await;
    assert_eq!(loans.body[0]["book_title"], "Kindred");
    assert_eq!(loans.body[0]["status"], "borrowed");
}

#[tokio::test]
async fn health_check_tracks_pool_lifecycle() {
    let app = TestApp::new().await;

    let healthy = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(healthy.status, StatusCode::OK);
    assert_eq!(healthy.body["status"], "healthy");

    app.services.db_pool.close().await;

    let unhealthy = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(unhealthy.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(unhealthy.body["status"], "unhealthy");
}
