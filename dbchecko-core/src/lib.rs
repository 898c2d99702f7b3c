//! Core library for dbchecko, a database connectivity checker and one-off
//! SQL runner for portal installations.
//!
//! The connection is described either by a Java properties file with
//! `jdbc.default.*` keys or by a Tomcat context file declaring the
//! `jdbc/LiferayPool` resource.
//!
//! # Security Guarantees
//! - Passwords are zeroized on drop and never logged
//! - Connection URLs are redacted in every log line and error message
//! - One connection per command, closed on every exit path
//!
//! # Example
//! ```rust,no_run
//! use dbchecko_core::{ConnectionConfig, DbChecko};
//!
//! # async fn run() -> dbchecko_core::Result<()> {
//! let checko = DbChecko::new(ConnectionConfig::new(
//!     "jdbc:postgresql://db:5432/lportal",
//!     "liferay",
//!     "secret",
//!     "org.postgresql.Driver",
//! ));
//!
//! if checko.check().await {
//!     checko.execute_select("SELECT userId, screenName FROM User_", &mut std::io::stdout()).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod checko;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;

// Re-export commonly used types
pub use adapters::{DatabaseSession, DriverKind, DriverRegistry};
pub use checko::DbChecko;
pub use config::ConnectionConfig;
pub use error::{DbCheckoError, Result};
pub use output::TableFormatter;
pub use query::{ColumnInfo, QueryResult, UpdateResult};
