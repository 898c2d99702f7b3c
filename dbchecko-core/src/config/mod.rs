//! Connection configuration resolution.
//!
//! A [`ConnectionConfig`] comes from one of two sources: a Java properties
//! file with `jdbc.default.*` keys, or a Tomcat context file declaring the
//! `jdbc/LiferayPool` resource. The properties file wins when both are given.

mod connection;
pub mod properties;
pub mod resource;

pub use connection::ConnectionConfig;
pub use properties::{
    DRIVER_CLASS_NAME_PROPERTY, PASSWORD_PROPERTY, PropertiesError, URL_PROPERTY, USER_PROPERTY,
    from_properties, from_properties_file, parse_properties,
};
pub use resource::{
    LIFERAY_POOL_RESOURCE_NAME, ResourceNode, from_resource_file, from_resource_str,
};

use crate::Result;
use crate::error::DbCheckoError;
use std::path::Path;

/// Resolves the connection configuration from the given sources.
///
/// # Errors
/// * `MissingConfigSource` if neither path is given
/// * any error of [`from_properties_file`] or [`from_resource_file`]
pub fn resolve(properties: Option<&Path>, resource: Option<&Path>) -> Result<ConnectionConfig> {
    let config = match (properties, resource) {
        (Some(path), _) => from_properties_file(path)?,
        (None, Some(path)) => from_resource_file(path)?,
        (None, None) => return Err(DbCheckoError::MissingConfigSource),
    };

    tracing::debug!("Resolved connection configuration: {}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_requires_a_source() {
        assert!(matches!(
            resolve(None, None),
            Err(DbCheckoError::MissingConfigSource)
        ));
    }

    #[test]
    fn test_resolve_properties_before_resource() {
        let dir = tempfile::tempdir().unwrap();
        let properties = dir.path().join("portal-ext.properties");
        std::fs::write(
            &properties,
            "jdbc.default.url=jdbc:sqlite:/tmp/from-properties.db\n\
             jdbc.default.driverClassName=org.sqlite.JDBC\n",
        )
        .unwrap();
        // Unreadable on purpose; it must not be touched.
        let resource = dir.path().join("missing-context.xml");

        let config = resolve(Some(&properties), Some(&resource)).unwrap();
        assert_eq!(config.url(), "jdbc:sqlite:/tmp/from-properties.db");
        assert_eq!(config.driver(), "org.sqlite.JDBC");
    }

    #[test]
    fn test_resolve_resource_only() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("context.xml");
        std::fs::write(
            &resource,
            r#"<Context><Resource name="jdbc/LiferayPool" url="jdbc:sqlite:/tmp/ctx.db" driverClassName="org.sqlite.JDBC"/></Context>"#,
        )
        .unwrap();

        let config = resolve(None, Some(&resource)).unwrap();
        assert_eq!(config.url(), "jdbc:sqlite:/tmp/ctx.db");
        assert_eq!(config.user(), "");
    }
}
