//! Normalized database connection descriptor.

use crate::error::redact_database_url;
use zeroize::Zeroizing;

/// The four settings needed to reach a database.
///
/// # Security
/// The password lives in a `Zeroizing` container and is cleared on drop.
/// Neither `Debug` nor `Display` print it; `Display` shows the redacted URL.
///
/// # Example
/// ```rust
/// use dbchecko_core::ConnectionConfig;
///
/// let config = ConnectionConfig::new(
///     "jdbc:postgresql://db:5432/lportal",
///     "liferay",
///     "secret",
///     "org.postgresql.Driver",
/// );
///
/// assert_eq!(config.user(), "liferay");
/// assert!(!config.to_string().contains("secret"));
/// ```
#[derive(Clone)]
pub struct ConnectionConfig {
    url: String,
    user: String,
    password: Zeroizing<String>,
    driver: String,
}

impl ConnectionConfig {
    /// Creates a connection descriptor.
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        driver: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: Zeroizing::new(password.into()),
            driver: driver.into(),
        }
    }

    /// Connection URL, JDBC style or native.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Database user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Database password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Driver identifier looked up in the driver registry.
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// URL with credentials masked, safe for logs and error messages.
    pub fn redacted_url(&self) -> String {
        redact_database_url(&self.url)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.redacted_url())
            .field("user", &self.user)
            .field("driver", &self.driver)
            // password is intentionally omitted
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.redacted_url(), self.driver)
    }
}
