//! JDBC URL translation.
//!
//! Portal configuration files carry JDBC URLs (`jdbc:postgresql://db/lportal`).
//! sqlx expects its own schemes, so the `jdbc:` form is rewritten for the
//! selected engine. Native URLs pass through untouched.

use super::DriverKind;
use crate::Result;
use crate::error::{DbCheckoError, Reason, redact_database_url};

impl DriverKind {
    /// JDBC prefixes, including the subprotocol colon.
    const fn jdbc_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => &["jdbc:sqlite:"],
            Self::Postgres => &["jdbc:postgresql:"],
            Self::MySql => &["jdbc:mysql:", "jdbc:mariadb:"],
        }
    }

    /// Scheme prefixes sqlx accepts for this engine.
    const fn native_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => &["sqlite:"],
            Self::Postgres => &["postgres:", "postgresql:"],
            Self::MySql => &["mysql:", "mariadb:"],
        }
    }

    const fn native_scheme(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite:",
            Self::Postgres => "postgres:",
            Self::MySql => "mysql:",
        }
    }
}

/// Rewrites `url` into the form sqlx understands for `kind`.
///
/// # Example
/// ```rust
/// use dbchecko_core::adapters::{DriverKind, native_url};
///
/// let url = native_url("jdbc:postgresql://db:5432/lportal", DriverKind::Postgres).unwrap();
/// assert_eq!(url, "postgres://db:5432/lportal");
/// ```
///
/// # Errors
/// Returns `ConnectionFailed` when the URL scheme belongs to another engine
/// or is missing.
pub fn native_url(url: &str, kind: DriverKind) -> Result<String> {
    if let Some(rest) = kind
        .jdbc_prefixes()
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
    {
        return Ok(format!("{}{}", kind.native_scheme(), rest));
    }

    if kind
        .native_prefixes()
        .iter()
        .any(|prefix| url.starts_with(prefix))
    {
        return Ok(url.to_string());
    }

    Err(DbCheckoError::connection_failed(
        redact_database_url(url),
        Reason(format!("URL scheme does not match the {kind} driver")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jdbc_urls_are_translated() {
        let cases = [
            (
                "jdbc:postgresql://db:5432/lportal?sslmode=disable",
                DriverKind::Postgres,
                "postgres://db:5432/lportal?sslmode=disable",
            ),
            (
                "jdbc:mysql://db:3306/lportal?useUnicode=true",
                DriverKind::MySql,
                "mysql://db:3306/lportal?useUnicode=true",
            ),
            ("jdbc:mariadb://db/lportal", DriverKind::MySql, "mysql://db/lportal"),
            ("jdbc:sqlite:/var/lib/app.db", DriverKind::Sqlite, "sqlite:/var/lib/app.db"),
            ("jdbc:sqlite::memory:", DriverKind::Sqlite, "sqlite::memory:"),
        ];

        for (input, kind, expected) in cases {
            assert_eq!(native_url(input, kind).unwrap(), expected, "input {input}");
        }
    }

    #[test]
    fn test_native_urls_pass_through() {
        for (input, kind) in [
            ("postgres://u:p@db/app", DriverKind::Postgres),
            ("postgresql://db/app", DriverKind::Postgres),
            ("mysql://db/app", DriverKind::MySql),
            ("sqlite://./local.db?mode=rwc", DriverKind::Sqlite),
        ] {
            assert_eq!(native_url(input, kind).unwrap(), input);
        }
    }

    #[test]
    fn test_scheme_mismatch_is_connection_failure() {
        for (input, kind) in [
            ("jdbc:mysql://db/app", DriverKind::Postgres),
            ("postgres://db/app", DriverKind::Sqlite),
            ("jdbc:hsqldb:mem:users", DriverKind::Sqlite),
            ("", DriverKind::MySql),
        ] {
            assert!(
                matches!(native_url(input, kind), Err(DbCheckoError::ConnectionFailed { .. })),
                "{input} should not be accepted for {kind}"
            );
        }
    }

    #[test]
    fn test_mismatch_error_hides_password() {
        let error = native_url("jdbc:mysql://sa:hunter2@db/app", DriverKind::Postgres).unwrap_err();
        assert!(!error.to_string().contains("hunter2"));
    }
}
