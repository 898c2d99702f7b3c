//! Command orchestration.
//!
//! [`DbChecko`] ties configuration, connection, execution and output together
//! for the three commands. Each command opens its own session and closes it
//! before returning, whether the command succeeded or not.

use crate::adapters::{self, DatabaseSession};
use crate::config::{self, ConnectionConfig};
use crate::error::DbCheckoError;
use crate::query::{self, UpdateResult};
use crate::{Result, output};
use std::io::Write;
use std::path::Path;

/// Prefix of the line printed after an update.
pub const UPDATED_ROWS_LABEL: &str = "Updated rows count: ";

/// Runs dbchecko commands against one configured database.
#[derive(Debug, Clone)]
pub struct DbChecko {
    config: ConnectionConfig,
}

impl DbChecko {
    /// Creates an orchestrator for an already resolved configuration.
    pub const fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Resolves the configuration from a properties file or a context file.
    ///
    /// # Errors
    /// See [`config::resolve`].
    pub fn from_sources(properties: Option<&Path>, resource: Option<&Path>) -> Result<Self> {
        config::resolve(properties, resource).map(Self::new)
    }

    /// The connection configuration in use.
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Tests whether the database is reachable.
    pub async fn check(&self) -> bool {
        tracing::info!("Checking connection to {}", self.config);
        adapters::is_reachable(&self.config).await
    }

    /// Runs a `SELECT` and writes the result table to `out`.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    /// Connection, query and output errors are returned after the session is
    /// closed.
    pub async fn execute_select<W: Write + ?Sized>(&self, query: &str, out: &mut W) -> Result<u64> {
        let mut session = adapters::open(&self.config).await?;
        let outcome = select_into(session.as_mut(), query, out).await;
        finish(session, outcome).await
    }

    /// Runs a data-modifying statement.
    ///
    /// # Errors
    /// Connection and query errors are returned after the session is closed.
    pub async fn execute_update(&self, query: &str) -> Result<UpdateResult> {
        let mut session = adapters::open(&self.config).await?;
        let outcome = query::run_update(session.as_mut(), query).await;
        finish(session, outcome).await
    }

    /// Runs a data-modifying statement and writes `Updated rows count: N` to `out`.
    ///
    /// # Errors
    /// As [`execute_update`](Self::execute_update), plus `Io` if the line
    /// cannot be written.
    pub async fn execute_update_to<W: Write + ?Sized>(
        &self,
        query: &str,
        out: &mut W,
    ) -> Result<UpdateResult> {
        let result = self.execute_update(query).await?;
        writeln!(out, "{UPDATED_ROWS_LABEL}{}", result.affected_rows)
            .and_then(|()| out.flush())
            .map_err(|e| DbCheckoError::io("Failed to write update result", e))?;
        Ok(result)
    }
}

async fn select_into<W: Write + ?Sized>(
    session: &mut dyn DatabaseSession,
    query: &str,
    out: &mut W,
) -> Result<u64> {
    let (columns, rows) = query::run_select(session, query).await?.into_parts();
    output::write_table(&columns, rows, out).await
}

/// Closes the session and returns the command outcome unchanged.
/// Close failures are logged only.
async fn finish<T>(session: Box<dyn DatabaseSession>, outcome: Result<T>) -> Result<T> {
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close database session: {}", e);
    }
    outcome
}
