//! One-off maintenance tasks run from the command line.

use anyhow::{bail, Context, Result};
use sqlx::{Connection, Executor, PgConnection};
use tracing::info;

/// What `enable_extensions` did for a given database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionStatus {
    Enabled,
    /// SQLite has no extension catalogue, so nothing was executed.
    NotApplicable,
}

/// Enable the `vector` extension on a PostgreSQL database. Safe to run repeatedly.
pub async fn enable_extensions(database_url: &str) -> Result<ExtensionStatus> {
    if database_url.starts_with("sqlite:") {
        info!("sqlite database detected, no extensions to enable");
        return Ok(ExtensionStatus::NotApplicable);
    }

    if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")) {
        bail!("unsupported database url scheme for extension setup");
    }

    let mut conn = PgConnection::connect(database_url)
        .await
        .context("failed to connect to postgres")?;
    conn.execute("CREATE EXTENSION IF NOT EXISTS vector")
        .await
        .context("failed to enable the vector extension")?;
    conn.close().await.context("failed to close postgres connection")?;

    info!("vector extension enabled");
    Ok(ExtensionStatus::Enabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_urls_are_a_no_op() {
        let status = enable_extensions("sqlite://libris.db").await.unwrap();
        assert_eq!(status, ExtensionStatus::NotApplicable);
    }

    #[tokio::test]
    async fn test_unknown_schemes_are_rejected() {
        assert!(enable_extensions("mysql://localhost/libris").await.is_err());
    }
}
