use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use libris_config::AppConfig;
use libris_database::testing::insert_user;
use libris_runtime::BackendServices;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('books', 'transactions', 'reviews') ORDER BY name",
    )
    .fetch_all(&services.db_pool)
    .await?;

    assert_eq!(tables, vec!["books", "reviews", "transactions"]);
    assert!(db_path.exists());

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_purges_expired_sessions() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("sessions.db")), 2);

    let services = initialise(&config).await?;
    let user_id = insert_user(&services.db_pool, "reader@example.com", "member").await;
    for (token, expires_at) in [
        ("stale", "2000-01-01T00:00:00Z"),
        ("fresh", "2999-01-01T00:00:00Z"),
    ] {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .bind("2000-01-01T00:00:00Z")
        .execute(&services.db_pool)
        .await?;
    }
    services.shutdown().await;

    let services = initialise(&config).await?;
    let tokens: Vec<String> = sqlx::query_scalar("SELECT token FROM sessions")
        .fetch_all(&services.db_pool)
        .await?;
    assert_eq!(tokens, vec!["fresh"]);

    services.shutdown().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_reports_unusable_database_path() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory")?;
    let config = build_config(sqlite_url(&blocker.join("nested/libris.db")), 1);

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("initialise should fail when the database directory cannot be created"),
        Err(error) => error,
    };
    assert!(
        error.to_string().contains("failed to initialise database"),
        "unexpected error: {error:#}"
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn services_share_the_configured_loan_rules() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = build_config(sqlite_url(&temp_dir.path().join("rules.db")), 2);
    config.library.max_active_loans = 1;

    let services = initialise(&config).await?;
    let reader = insert_user(&services.db_pool, "reader@example.com", "member").await;
    let first = libris_database::testing::insert_book(&services.db_pool, "Dune", 1).await;
    let second = libris_database::testing::insert_book(&services.db_pool, "Emma", 1).await;

    services
        .library
        .circulation
        .checkout(reader, first, None)
        .await?;
    let refused = services
        .library
        .circulation
        .checkout(reader, second, None)
        .await;
    assert!(refused.is_err(), "second loan should exceed the limit");

    services.shutdown().await;
    Ok(())
}

#[test]
fn telemetry_init_tracing_sets_global_subscriber() {
    libris_runtime::telemetry::init_tracing().expect("first initialisation should succeed");

    let second = libris_runtime::telemetry::init_tracing();
    assert!(
        second.is_err(),
        "initialising telemetry twice should fail with global subscriber already set"
    );
}

#[tokio::test(flavor = "multi_thread")]
#[cfg_attr(not(unix), ignore = "requires Unix signal handling")]
async fn shutdown_signal_completes_on_ctrl_c_notification() -> Result<()> {
    let shutdown_task = tokio::spawn(async { libris_runtime::shutdown_signal().await });

    sleep(Duration::from_millis(50)).await;
    #[cfg(unix)]
    unsafe {
        libc::raise(libc::SIGINT);
    }

    timeout(Duration::from_secs(2), shutdown_task).await??;
    Ok(())
}
