use anyhow::{Context, Result};
use libris_auth::Authenticator;
use libris_config::AppConfig;
use libris_database::initialize_database;
use libris_library::LibraryServices;
use sqlx::SqlitePool;
use tracing::{info, warn};

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global subscriber. `RUST_LOG` overrides the `info` default.
    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::TRACE)
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// The pool and the services built over it, shared by the server and the CLI.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub library: LibraryServices,
}

impl BackendServices {
    /// Open and migrate the database, then build every service over it.
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth);
        match authenticator.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "removed expired sessions"),
            Err(error) => warn!(%error, "failed to purge expired sessions"),
        }

        let library = LibraryServices::new(db_pool.clone(), config.library.clone());

        info!(
            loan_days = config.library.loan_days,
            max_active_loans = config.library.max_active_loans,
            "library services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            library,
        })
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn shutdown(self) {
        self.db_pool.close().await;
        info!("database pool closed");
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
