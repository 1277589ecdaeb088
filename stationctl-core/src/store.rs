//! Database handle and schema bootstrap
//!
//! Uses the sqlx `Any` driver so the same queries run against PostgreSQL in
//! production and SQLite for tests and local use. Every query uses `$N`
//! placeholders, which both backends accept.

use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::{Result, StationError};
use crate::repos::{EmployeeRepo, PositionRepo, StationRepo};

/// Which database the store is talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            Err(StationError::config(format!(
                "unsupported database URL scheme in '{}' (expected postgres:// or sqlite:)",
                redact(url)
            )))
        }
    }

    fn id_column(self) -> &'static str {
        match self {
            Backend::Postgres => "BIGSERIAL PRIMARY KEY",
            Backend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        }
    }
}

/// Connection pool handle passed explicitly to every operation
#[derive(Debug, Clone)]
pub struct Store {
    pool: AnyPool,
    backend: Backend,
}

impl Store {
    /// Connect using the configured URL. Failure here is fatal for the CLI.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let url = config.require_url()?;
        let backend = Backend::from_url(url)?;

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections())
            .acquire_timeout(config.acquire_timeout())
            .connect(url)
            .await
            .map_err(|source| StationError::Connection { source })?;

        info!("Connected to {:?} database at {}", backend, redact(url));
        Ok(Self { pool, backend })
    }

    /// Open a private in-memory SQLite database with the schema applied
    ///
    /// The pool is pinned to one connection that never expires, since each
    /// SQLite memory connection is its own database.
    pub async fn open_in_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|source| StationError::Connection { source })?;

        let store = Self {
            pool,
            backend: Backend::Sqlite,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn stations(&self) -> StationRepo<'_> {
        StationRepo::new(&self.pool)
    }

    pub fn positions(&self) -> PositionRepo<'_> {
        PositionRepo::new(&self.pool)
    }

    pub fn employees(&self) -> EmployeeRepo<'_> {
        EmployeeRepo::new(&self.pool)
    }

    /// Create the stations, positions and employees tables if absent
    pub async fn ensure_schema(&self) -> Result<()> {
        let id = self.backend.id_column();
        let statements = [
            format!(
                "CREATE TABLE IF NOT EXISTS stations (
                    id {id},
                    title TEXT NOT NULL UNIQUE,
                    city TEXT NOT NULL DEFAULT '',
                    address TEXT NOT NULL DEFAULT ''
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS positions (
                    id {id},
                    title TEXT NOT NULL,
                    add_date TEXT NOT NULL DEFAULT '',
                    salary BIGINT NOT NULL DEFAULT 0
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS employees (
                    id {id},
                    full_name TEXT NOT NULL,
                    start_date TEXT NOT NULL DEFAULT '',
                    station_id BIGINT REFERENCES stations(id),
                    position_id BIGINT NOT NULL REFERENCES positions(id)
                )"
            ),
            "CREATE INDEX IF NOT EXISTS employees_station_id_idx ON employees (station_id)"
                .to_string(),
        ];

        for statement in &statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StationError::query("create schema", e))?;
        }

        debug!("Schema ensured on {:?} backend", self.backend);
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}

/// Hide the password part of a connection URL for logging
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let userinfo = &url[scheme_end + 3..at];
            match userinfo.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
