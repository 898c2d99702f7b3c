//! Driver identifiers and the process-wide driver registry.
//!
//! Configuration files name their driver with a JDBC class name such as
//! `org.postgresql.Driver`. The registry maps those names, plus a few short
//! aliases, onto the database engines compiled into this build.

use crate::Result;
use crate::error::DbCheckoError;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Database engines dbchecko can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DriverKind {
    /// SQLite database files
    Sqlite,
    /// PostgreSQL servers
    Postgres,
    /// MySQL and MariaDB servers
    MySql,
}

impl DriverKind {
    /// All engines, whether compiled in or not.
    pub const ALL: [Self; 3] = [Self::Sqlite, Self::Postgres, Self::MySql];

    /// Identifiers accepted for this engine.
    pub const fn identifiers(self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => &["sqlite", "org.sqlite.JDBC"],
            Self::Postgres => &["postgres", "postgresql", "org.postgresql.Driver"],
            Self::MySql => &[
                "mysql",
                "mariadb",
                "com.mysql.jdbc.Driver",
                "com.mysql.cj.jdbc.Driver",
                "org.mariadb.jdbc.Driver",
            ],
        }
    }

    /// Cargo feature that compiles this engine in.
    pub const fn feature(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
        }
    }

    /// Whether this build includes the engine.
    pub const fn is_available(self) -> bool {
        match self {
            Self::Sqlite => cfg!(feature = "sqlite"),
            Self::Postgres => cfg!(feature = "postgresql"),
            Self::MySql => cfg!(feature = "mysql"),
        }
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sqlite => "SQLite",
            Self::Postgres => "PostgreSQL",
            Self::MySql => "MySQL",
        };
        f.write_str(name)
    }
}

/// Identifier to engine mapping for the drivers compiled into this build.
#[derive(Debug, Clone, Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<&'static str, DriverKind>,
}

impl DriverRegistry {
    /// Gets the registry populated with every available driver.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<DriverRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::builtin)
    }

    fn builtin() -> Self {
        let mut registry = Self::default();
        for kind in DriverKind::ALL.into_iter().filter(|kind| kind.is_available()) {
            registry.register(kind);
        }
        registry
    }

    /// Adds all identifiers of `kind`.
    pub fn register(&mut self, kind: DriverKind) {
        for identifier in kind.identifiers() {
            self.drivers.insert(*identifier, kind);
        }
    }

    /// Resolves a driver identifier. Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns `DriverNotFound` for unknown identifiers and for engines not
    /// compiled into this build.
    pub fn lookup(&self, identifier: &str) -> Result<DriverKind> {
        self.drivers
            .get(identifier.trim())
            .copied()
            .ok_or_else(|| DbCheckoError::driver_not_found(identifier))
    }

    /// Registered identifiers in lexical order.
    pub fn identifiers(&self) -> impl Iterator<Item = (&'static str, DriverKind)> + '_ {
        self.drivers.iter().map(|(identifier, kind)| (*identifier, *kind))
    }

    /// Whether no driver is registered.
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
