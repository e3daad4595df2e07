use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use libris_auth::{NewUser, UserRole};
use libris_config::{load as load_config, AppConfig};
use libris_database::{enable_extensions, initialize_database, ExtensionStatus};
use libris_gateway::{create_router, GatewayState};
use libris_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "libris-server")]
#[command(about = "Libris library backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply the embedded database migrations and exit
    Migrate,
    /// Enable the PostgreSQL `vector` extension (no-op on SQLite)
    EnableExtensions {
        /// Database to operate on. Defaults to the configured `database.url`.
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Register an account with a password
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: Option<String>,
        /// member, librarian or admin
        #[arg(long, default_value = "member")]
        role: UserRole,
    },
    /// Send an overdue notice for every open loan past its due date
    NotifyOverdue,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config).await,
        Commands::Migrate => migrate(&config).await,
        Commands::EnableExtensions { database_url } => {
            let url = database_url.unwrap_or_else(|| config.database.url.clone());
            run_enable_extensions(&url).await
        }
        Commands::CreateUser {
            email,
            password,
            display_name,
            role,
        } => {
            let new_user = NewUser {
                email: &email,
                password: &password,
                display_name: display_name.as_deref(),
                role,
            };
            create_user(&config, new_user).await
        }
        Commands::NotifyOverdue => notify_overdue(&config).await,
    }
}

async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    info!("starting Libris backend");

    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;

    let state = GatewayState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        services.library.clone(),
    );
    let app = create_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(libris_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    services.shutdown().await;
    info!("backend shut down");
    Ok(())
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = initialize_database(&config.database)
        .await
        .context("failed to migrate database")?;
    pool.close().await;

    println!("Migrations applied to {}", config.database.url);
    Ok(())
}

async fn run_enable_extensions(database_url: &str) -> anyhow::Result<()> {
    match enable_extensions(database_url).await? {
        ExtensionStatus::Enabled => println!("Extension `vector` is enabled"),
        ExtensionStatus::NotApplicable => {
            println!("Database does not support extensions, nothing to do")
        }
    }
    Ok(())
}

async fn create_user(config: &AppConfig, new_user: NewUser<'_>) -> anyhow::Result<()> {
    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;

    let user = services
        .authenticator
        .register_with_password(new_user)
        .await
        .context("failed to create user")?;

    println!(
        "Created {} {} (id {}, public id {})",
        user.role, user.email, user.id, user.public_id
    );

    services.shutdown().await;
    Ok(())
}

async fn notify_overdue(config: &AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;

    let created = services
        .library
        .circulation
        .notify_overdue(Utc::now())
        .await
        .context("failed to send overdue notices")?;

    println!("Sent {created} overdue notice(s)");

    services.shutdown().await;
    Ok(())
}
