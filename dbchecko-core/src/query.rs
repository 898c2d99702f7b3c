//! Query execution against an open session.
//!
//! Query text is sent verbatim: no parameter binding, no escaping. The read
//! path hands back column metadata immediately and the rows as a lazy stream
//! borrowing the session, so large results are never buffered.

use crate::Result;
use crate::adapters::DatabaseSession;
use crate::output::MIN_COLUMN_WIDTH;
use futures::stream::BoxStream;

/// One result row; `None` marks SQL `NULL`.
pub type Row = Vec<Option<String>>;

/// Forward-only stream of decoded rows.
pub type RowStream<'s> = BoxStream<'s, Result<Row>>;

/// Metadata for one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column label as reported by the database
    pub name: String,
    /// Database type name, used in error messages
    pub type_name: String,
}

impl ColumnInfo {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Width of this column in table output: the name length, at least
    /// [`MIN_COLUMN_WIDTH`].
    pub fn display_width(&self) -> usize {
        self.name.chars().count().max(MIN_COLUMN_WIDTH)
    }
}

/// Result of a `SELECT`: columns up front, rows on demand.
pub struct QueryResult<'s> {
    columns: Vec<ColumnInfo>,
    rows: RowStream<'s>,
}

impl<'s> QueryResult<'s> {
    /// Pairs column metadata with its row stream.
    pub fn new(columns: Vec<ColumnInfo>, rows: RowStream<'s>) -> Self {
        Self { columns, rows }
    }

    /// Column metadata, in select-list order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Splits the result into its parts.
    pub fn into_parts(self) -> (Vec<ColumnInfo>, RowStream<'s>) {
        (self.columns, self.rows)
    }

    /// Consumes the result, keeping only the rows.
    pub fn into_rows(self) -> RowStream<'s> {
        self.rows
    }
}

impl std::fmt::Debug for QueryResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// Outcome of a data-modifying statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Rows inserted, updated or deleted
    pub affected_rows: u64,
}

/// Runs a `SELECT` and returns its columns and lazy rows.
///
/// # Errors
/// Returns `QueryFailed` if the database rejects the statement.
pub async fn run_select<'s>(
    session: &'s mut dyn DatabaseSession,
    query: &'s str,
) -> Result<QueryResult<'s>> {
    tracing::debug!("Executing select on {}: {}", session.driver(), query);

    let result = session.run_select(query).await?;

    tracing::debug!("Select returned {} column(s)", result.columns().len());
    Ok(result)
}

/// Runs an `INSERT`, `UPDATE`, `DELETE` or DDL statement.
///
/// # Errors
/// Returns `QueryFailed` if the database rejects the statement.
pub async fn run_update(session: &mut dyn DatabaseSession, query: &str) -> Result<UpdateResult> {
    tracing::debug!("Executing update on {}: {}", session.driver(), query);

    let result = session.run_update(query).await?;

    tracing::debug!("Update affected {} row(s)", result.affected_rows);
    Ok(result)
}
