//! Database sessions and the connector that opens them.
//!
//! A [`DatabaseSession`] is one live connection owned by a single command
//! invocation. Engines are selected through the [`DriverRegistry`] and compiled
//! in with cargo features.
//!
//! # Module Structure
//! - `registry`: driver identifiers and [`DriverKind`]
//! - `jdbc`: JDBC to sqlx URL translation
//! - `session`: sqlx-backed sessions, one per engine
//! - `cell`: value to text rendering

use crate::config::ConnectionConfig;
use crate::query::{QueryResult, UpdateResult};
use crate::Result;
use async_trait::async_trait;

mod cell;
pub mod jdbc;
pub mod registry;
mod session;

pub use jdbc::native_url;
pub use registry::{DriverKind, DriverRegistry};

/// One open database connection.
///
/// # Object Safety
/// The trait is object-safe; the connector hands out `Box<dyn DatabaseSession>`.
#[async_trait]
pub trait DatabaseSession: Send {
    /// Engine behind this session.
    fn driver(&self) -> DriverKind;

    /// Prepares `query`, reads its column metadata and starts streaming rows.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the statement is rejected.
    async fn run_select<'s>(&'s mut self, query: &'s str) -> Result<QueryResult<'s>>;

    /// Executes a data-modifying statement.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the statement is rejected.
    async fn run_update(&mut self, query: &str) -> Result<UpdateResult>;

    /// Closes the connection gracefully.
    ///
    /// # Errors
    /// Returns `ConnectionFailed` if the shutdown handshake fails.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a session for the given connection configuration.
///
/// # Errors
/// * `DriverNotFound` if the driver identifier is not registered
/// * `ConnectionFailed` if the URL does not fit the driver or the database
///   cannot be reached
pub async fn open(config: &ConnectionConfig) -> Result<Box<dyn DatabaseSession>> {
    let kind = DriverRegistry::global().lookup(config.driver())?;
    let url = native_url(config.url(), kind)?;

    tracing::debug!("Connecting to {} with {} driver", config.redacted_url(), kind);

    let session: Box<dyn DatabaseSession> = match kind {
        #[cfg(feature = "sqlite")]
        DriverKind::Sqlite => Box::new(session::sqlite::SqliteSession::connect(&url, config).await?),
        #[cfg(feature = "postgresql")]
        DriverKind::Postgres => {
            Box::new(session::postgres::PostgresSession::connect(&url, config).await?)
        }
        #[cfg(feature = "mysql")]
        DriverKind::MySql => Box::new(session::mysql::MySqlSession::connect(&url, config).await?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(crate::error::DbCheckoError::driver_not_found(format!(
                "{} (compile with --features {})",
                config.driver(),
                other.feature()
            )));
        }
    };

    tracing::info!("Connected to {} ({})", config.redacted_url(), kind);
    Ok(session)
}

/// Checks whether the database is reachable.
///
/// Opens a session and closes it again. Failures of any kind are logged and
/// reported as `false`; this function never returns an error.
pub async fn is_reachable(config: &ConnectionConfig) -> bool {
    match open(config).await {
        Ok(session) => {
            if let Err(e) = session.close().await {
                tracing::warn!("Connection opened but did not close cleanly: {}", e);
            }
            true
        }
        Err(e) => {
            tracing::warn!("Failed to make connection to {}: {}", config.redacted_url(), e);
            false
        }
    }
}
