//! sqlx-backed sessions.
//!
//! Every engine uses a single unpooled sqlx connection. The session types are
//! generated by [`define_sqlx_session!`]; engines differ only in their
//! connection types, how credentials are applied, and which Rust types their
//! column values decode into.

use crate::config::ConnectionConfig;

/// Generates a session module for one sqlx engine.
///
/// # Parameters
///
/// - `$module`: module to generate (e.g. `postgres`)
/// - `$session`: session struct name
/// - `$kind`: the `DriverKind` variant
/// - `$connection` / `$options` / `$row`: the engine's sqlx types
/// - `$apply_credentials`: `fn($options, &ConnectionConfig) -> $options`
/// - `$cell`: decode attempts in order; the first type compatible with the
///   value wins
macro_rules! define_sqlx_session {
    (
        $module:ident,
        $session:ident,
        $kind:expr,
        connection: $connection:ty,
        options: $options:ty,
        row: $row:ty,
        credentials: $apply_credentials:path,
        cells: [$($cell:ty),+ $(,)?]
    ) => {
        pub(crate) mod $module {
            use crate::adapters::cell::CellText;
            use crate::adapters::{DatabaseSession, DriverKind};
            use crate::config::ConnectionConfig;
            use crate::error::{DbCheckoError, Reason};
            use crate::query::{ColumnInfo, QueryResult, Row as CellRow, UpdateResult};
            use crate::Result;
            use futures::StreamExt;
            use sqlx::{Column, ConnectOptions, Connection, Row, Statement, TypeInfo};
            use std::str::FromStr;

            pub(crate) struct $session {
                connection: $connection,
            }

            impl $session {
                pub(crate) async fn connect(url: &str, config: &ConnectionConfig) -> Result<Self> {
                    let options = <$options>::from_str(url)
                        .map_err(|e| DbCheckoError::connection_failed(config.redacted_url(), e))?;
                    let options = $apply_credentials(options, config).disable_statement_logging();

                    let connection = options
                        .connect()
                        .await
                        .map_err(|e| DbCheckoError::connection_failed(config.redacted_url(), e))?;

                    Ok(Self { connection })
                }
            }

            #[async_trait::async_trait]
            impl DatabaseSession for $session {
                fn driver(&self) -> DriverKind {
                    $kind
                }

                async fn run_select<'s>(&'s mut self, query: &'s str) -> Result<QueryResult<'s>> {
                    let statement = sqlx::Executor::prepare(&mut self.connection, query)
                        .await
                        .map_err(|e| DbCheckoError::query_failed("statement rejected", e))?;

                    let columns = statement
                        .columns()
                        .iter()
                        .map(|column| ColumnInfo::new(column.name(), column.type_info().name()))
                        .collect();

                    let rows = sqlx::query(query)
                        .fetch(&mut self.connection)
                        .map(|row| {
                            let row = row.map_err(|e| DbCheckoError::query_failed("row fetch failed", e))?;
                            decode_row(&row)
                        })
                        .boxed();

                    Ok(QueryResult::new(columns, rows))
                }

                async fn run_update(&mut self, query: &str) -> Result<UpdateResult> {
                    let result = sqlx::query(query)
                        .execute(&mut self.connection)
                        .await
                        .map_err(|e| DbCheckoError::query_failed("statement rejected", e))?;

                    Ok(UpdateResult {
                        affected_rows: result.rows_affected(),
                    })
                }

                async fn close(self: Box<Self>) -> Result<()> {
                    let Self { connection } = *self;
                    connection
                        .close()
                        .await
                        .map_err(|e| DbCheckoError::connection_failed("closing connection", e))
                }
            }

            fn decode_row(row: &$row) -> Result<CellRow> {
                (0..row.len()).map(|index| decode_cell(row, index)).collect()
            }

            fn decode_cell(row: &$row, index: usize) -> Result<Option<String>> {
                $(
                    if let Ok(value) = row.try_get::<Option<$cell>, _>(index) {
                        return Ok(value.map(CellText::into_cell));
                    }
                )+

                let (name, type_name) = row
                    .columns()
                    .get(index)
                    .map(|column| (column.name().to_string(), column.type_info().name().to_string()))
                    .unwrap_or_default();
                Err(DbCheckoError::query_failed(
                    format!("cannot render column '{name}'"),
                    Reason(format!("unsupported column type {type_name}")),
                ))
            }
        }
    };
}

#[cfg(feature = "sqlite")]
fn sqlite_credentials(
    options: sqlx::sqlite::SqliteConnectOptions,
    config: &ConnectionConfig,
) -> sqlx::sqlite::SqliteConnectOptions {
    if !config.user().is_empty() || !config.password().is_empty() {
        tracing::debug!("SQLite ignores user name and password");
    }
    options
}

#[cfg(feature = "postgresql")]
fn postgres_credentials(
    mut options: sqlx::postgres::PgConnectOptions,
    config: &ConnectionConfig,
) -> sqlx::postgres::PgConnectOptions {
    if !config.user().is_empty() {
        options = options.username(config.user());
    }
    if !config.password().is_empty() {
        options = options.password(config.password());
    }
    options
}

#[cfg(feature = "mysql")]
fn mysql_credentials(
    mut options: sqlx::mysql::MySqlConnectOptions,
    config: &ConnectionConfig,
) -> sqlx::mysql::MySqlConnectOptions {
    if !config.user().is_empty() {
        options = options.username(config.user());
    }
    if !config.password().is_empty() {
        options = options.password(config.password());
    }
    options
}

// SQLite values carry their storage class, so integers, reals, text and blobs
// each match exactly one of these.
#[cfg(feature = "sqlite")]
define_sqlx_session!(
    sqlite,
    SqliteSession,
    DriverKind::Sqlite,
    connection: sqlx::SqliteConnection,
    options: sqlx::sqlite::SqliteConnectOptions,
    row: sqlx::sqlite::SqliteRow,
    credentials: super::sqlite_credentials,
    cells: [
        String,
        i64,
        f64,
        bool,
        chrono::NaiveDateTime,
        chrono::DateTime<chrono::Utc>,
        chrono::NaiveDate,
        chrono::NaiveTime,
        Vec<u8>,
    ]
);

#[cfg(feature = "postgresql")]
define_sqlx_session!(
    postgres,
    PostgresSession,
    DriverKind::Postgres,
    connection: sqlx::PgConnection,
    options: sqlx::postgres::PgConnectOptions,
    row: sqlx::postgres::PgRow,
    credentials: super::postgres_credentials,
    cells: [
        String,
        i64,
        i32,
        i16,
        f64,
        f32,
        sqlx::types::BigDecimal,
        bool,
        chrono::NaiveDateTime,
        chrono::DateTime<chrono::Utc>,
        chrono::NaiveDate,
        chrono::NaiveTime,
        sqlx::postgres::types::PgInterval,
        uuid::Uuid,
        sqlx::postgres::types::Oid,
        sqlx::types::JsonValue,
        Vec<u8>,
    ]
);

#[cfg(feature = "mysql")]
define_sqlx_session!(
    mysql,
    MySqlSession,
    DriverKind::MySql,
    connection: sqlx::MySqlConnection,
    options: sqlx::mysql::MySqlConnectOptions,
    row: sqlx::mysql::MySqlRow,
    credentials: super::mysql_credentials,
    cells: [
        String,
        i64,
        u64,
        f64,
        f32,
        sqlx::types::BigDecimal,
        bool,
        chrono::NaiveDateTime,
        chrono::DateTime<chrono::Utc>,
        chrono::NaiveDate,
        chrono::NaiveTime,
        sqlx::types::JsonValue,
        Vec<u8>,
    ]
);
