use chrono::{Duration, SecondsFormat, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use libris_auth::{AuthError, Authenticator, NewUser, UserRole};
use libris_config::AuthConfig;
use libris_database::testing::create_test_pool;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> Self {
        let (pool, temp_dir) = create_test_pool().await;
        let config = AuthConfig {
            session_ttl_seconds: 3_600,
        };
        let authenticator = Authenticator::new(pool.clone(), &config);

        Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        }
    }

    async fn register(&self, email: &str, role: UserRole) -> Result<libris_auth::User, AuthError> {
        self.authenticator
            .register_with_password(NewUser {
                email,
                password: "correct horse battery",
                display_name: Some("Reader"),
                role,
            })
            .await
    }
}

#[tokio::test]
async fn register_then_login_issues_a_working_session() -> TestResult {
    let ctx = TestContext::new().await;

    let user = ctx.register("Reader@Example.com", UserRole::Member).await?;
    assert_eq!(user.email, "reader@example.com");
    assert_eq!(user.role, UserRole::Member);
    assert!(!user.public_id.is_empty());

    let (logged_in, session) = ctx
        .authenticator
        .login_with_password("reader@example.com", "correct horse battery")
        .await?;
    assert_eq!(logged_in.id, user.id);
    assert!(session.expires_at > Utc::now() + Duration::minutes(59));

    let (resolved, _) = ctx.authenticator.authenticate_token(&session.token).await?;
    assert_eq!(resolved, logged_in);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> TestResult {
    let ctx = TestContext::new().await;

    ctx.register("reader@example.com", UserRole::Member).await?;
    let error = ctx
        .register("READER@example.com", UserRole::Admin)
        .await
        .expect_err("second registration should fail");
    assert!(matches!(error, AuthError::UserExists));
    Ok(())
}

#[tokio::test]
async fn concurrent_registrations_of_one_email_create_one_user() -> TestResult {
    let ctx = TestContext::new().await;

    let (first, second) = tokio::join!(
        ctx.register("reader@example.com", UserRole::Member),
        ctx.register("reader@example.com", UserRole::Member)
    );
    let exists = [&first, &second]
        .iter()
        .filter(|result| matches!(result, Err(AuthError::UserExists)))
        .count();
    assert_eq!(exists, 1);
    assert!(first.is_ok() || second.is_ok());

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(users, 1);
    Ok(())
}

#[tokio::test]
async fn short_passwords_and_bad_emails_are_invalid_input() {
    let ctx = TestContext::new().await;

    let short = ctx
        .authenticator
        .register_with_password(NewUser {
            email: "reader@example.com",
            password: "short",
            display_name: None,
            role: UserRole::Member,
        })
        .await;
    assert!(matches!(short, Err(AuthError::InvalidInput(_))));

    let bad_email = ctx.register("not-an-email", UserRole::Member).await;
    assert!(matches!(bad_email, Err(AuthError::InvalidInput(_))));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> TestResult {
    let ctx = TestContext::new().await;
    ctx.register("reader@example.com", UserRole::Member).await?;

    let wrong = ctx
        .authenticator
        .login_with_password("reader@example.com", "incorrect password")
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    let unknown = ctx
        .authenticator
        .login_with_password("nobody@example.com", "correct horse battery")
        .await;
    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    Ok(())
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_removed() -> TestResult {
    let ctx = TestContext::new().await;
    let user = ctx.register("reader@example.com", UserRole::Member).await?;

    let expired_at = (Utc::now() - Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind("stale-token")
        .bind(user.id)
        .bind(&expired_at)
        .bind(&expired_at)
        .execute(&ctx.pool)
        .await?;

    let result = ctx.authenticator.authenticate_token("stale-token").await;
    assert!(matches!(result, Err(AuthError::SessionExpired)));

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token = 'stale-token'")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(remaining, 0);
    Ok(())
}

#[tokio::test]
async fn revoked_sessions_stop_authenticating() -> TestResult {
    let ctx = TestContext::new().await;
    ctx.register("reader@example.com", UserRole::Librarian).await?;

    let (user, session) = ctx
        .authenticator
        .login_with_password("reader@example.com", "correct horse battery")
        .await?;
    assert!(user.is_staff());

    assert!(ctx.authenticator.revoke_session(&session.token).await?);
    assert!(!ctx.authenticator.revoke_session(&session.token).await?);

    let result = ctx.authenticator.authenticate_token(&session.token).await;
    assert!(matches!(result, Err(AuthError::SessionNotFound)));
    Ok(())
}

#[tokio::test]
async fn purge_only_removes_expired_sessions() -> TestResult {
    let ctx = TestContext::new().await;
    let user = ctx.register("reader@example.com", UserRole::Member).await?;

    let (_, live) = ctx
        .authenticator
        .login_with_password("reader@example.com", "correct horse battery")
        .await?;

    let expired_at = (Utc::now() - Duration::days(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind("old-token")
        .bind(user.id)
        .bind(&expired_at)
        .bind(&expired_at)
        .execute(&ctx.pool)
        .await?;

    assert_eq!(ctx.authenticator.purge_expired_sessions().await?, 1);
    ctx.authenticator.authenticate_token(&live.token).await?;
    Ok(())
}
