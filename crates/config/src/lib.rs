//! Libris settings: HTTP listener, SQLite pool, session lifetime and
//! circulation rules.
//!
//! Sources are layered lowest first: built-in defaults, one TOML file,
//! `LIBRIS__SECTION__KEY` variables, then `DATABASE_URL`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Files tried relative to the working directory when `LIBRIS_CONFIG` is unset.
const CONFIG_SEARCH_PATHS: &[&str] = &[
    "libris.toml",
    "config/libris.toml",
    "crates/config/libris.toml",
    "../libris.toml",
    "../config/libris.toml",
];

const CONFIG_PATH_VAR: &str = "LIBRIS_CONFIG";
const ENV_PREFIX: &str = "LIBRIS";

/// Longest loan period a library may configure.
pub const MAX_LOAN_DAYS: u32 = 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

/// SQLite location and pool size. `url` accepts anything `sqlx` parses as a
/// SQLite connection string; the file is created when missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://libris.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a bearer session issued at login.
    #[serde(default = "AuthConfig::one_day")]
    pub session_ttl_seconds: u64,
}

impl AuthConfig {
    const fn one_day() -> u64 {
        24 * 60 * 60
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::one_day(),
        }
    }
}

/// Circulation rules applied by the lending services.
///
/// ```
/// use libris_config::LibraryConfig;
///
/// let library = LibraryConfig::default();
/// assert_eq!(library.loan_days, 14);
/// assert_eq!(library.max_active_loans, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "LibraryConfig::two_weeks")]
    pub loan_days: u32,
    #[serde(default = "LibraryConfig::five_loans")]
    pub max_active_loans: u32,
}

impl LibraryConfig {
    const fn two_weeks() -> u32 {
        14
    }

    const fn five_loans() -> u32 {
        5
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_LOAN_DAYS).contains(&self.loan_days) {
            bail!("library.loan_days must be between 1 and {MAX_LOAN_DAYS}");
        }
        if self.max_active_loans == 0 {
            bail!("library.max_active_loans must be at least 1");
        }
        Ok(())
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_days: Self::two_weeks(),
            max_active_loans: Self::five_loans(),
        }
    }
}

/// Resolve the Libris settings from every source.
///
/// `DATABASE_URL` wins over every other source for `database.url`, and the
/// circulation rules are range-checked before the config is returned.
///
/// ```
/// use libris_config::load;
///
/// std::env::remove_var("LIBRIS_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let mut builder = with_defaults(&AppConfig::default())?;

    match config_file()? {
        Some(path) => {
            debug!(path = %path.display(), "reading libris config file");
            builder = builder.add_source(config::File::from(path));
        }
        None => debug!("no libris config file, using defaults and environment"),
    }

    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

    if let Ok(url) = std::env::var("DATABASE_URL") {
        debug!("database url taken from DATABASE_URL");
        builder = builder.set_override("database.url", url)?;
    }

    let settings = builder
        .build()
        .context("unable to read libris settings")?
        .try_deserialize::<AppConfig>()
        .context("invalid libris settings")?;
    settings.library.validate()?;

    debug!(?settings, "libris settings resolved");
    Ok(settings)
}

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

fn with_defaults(defaults: &AppConfig) -> anyhow::Result<Builder> {
    let session_ttl = i64::try_from(defaults.auth.session_ttl_seconds).unwrap_or(i64::MAX);

    let builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.session_ttl_seconds", session_ttl)?
        .set_default("library.loan_days", i64::from(defaults.library.loan_days))?
        .set_default(
            "library.max_active_loans",
            i64::from(defaults.library.max_active_loans),
        )?;

    Ok(builder)
}

/// An explicit `LIBRIS_CONFIG` must exist; otherwise the first search path
/// found under the working directory is used.
fn config_file() -> anyhow::Result<Option<PathBuf>> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        let path = PathBuf::from(path);
        if !path.is_file() {
            bail!("{CONFIG_PATH_VAR} points at {}, which is not a file", path.display());
        }
        return Ok(Some(path));
    }

    let Ok(cwd) = std::env::current_dir() else {
        return Ok(None);
    };
    Ok(first_existing(&cwd, CONFIG_SEARCH_PATHS))
}

fn first_existing(root: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}
