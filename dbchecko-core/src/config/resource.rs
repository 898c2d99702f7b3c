//! Tomcat context file (`context.xml`) resource descriptors.
//!
//! The markup is parsed with `roxmltree` and immediately converted into a
//! [`ResourceNode`] tree, so the lookup logic never touches the parser.

use super::ConnectionConfig;
use crate::Result;
use crate::error::DbCheckoError;
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the pooled data source resource read from context files.
pub const LIFERAY_POOL_RESOURCE_NAME: &str = "jdbc/LiferayPool";

/// Element tag of data source declarations.
pub const RESOURCE_TAG: &str = "Resource";

/// An element with its attributes and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceNode {
    /// Element tag name (local part)
    pub tag: String,
    /// Attribute values by attribute name
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order
    pub children: Vec<ResourceNode>,
}

impl ResourceNode {
    /// Parses an XML document into a node tree rooted at its document element.
    ///
    /// # Errors
    /// Returns the parser error for malformed markup.
    pub fn parse(text: &str) -> std::result::Result<Self, roxmltree::Error> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(text, options)?;
        Ok(Self::from_element(document.root_element()))
    }

    fn from_element(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_element)
                .collect(),
        }
    }

    /// Value of an attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns the first node, in document order, with the given tag that
    /// satisfies `predicate`. The node itself is considered first.
    pub fn find<P>(&self, tag: &str, predicate: P) -> Option<&Self>
    where
        P: Fn(&Self) -> bool,
    {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.tag == tag && predicate(node) {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Shorthand for [`find`](Self::find) with an attribute-equality predicate.
    pub fn find_by_attribute(&self, tag: &str, attribute: &str, value: &str) -> Option<&Self> {
        self.find(tag, |node| node.attribute(attribute) == Some(value))
    }
}

/// Builds a [`ConnectionConfig`] from context-file markup.
///
/// Missing attributes on the matched element become empty strings.
///
/// # Errors
/// * `ConfigRead` if the markup is malformed
/// * `ResourceNotFound` if no `Resource` is named `jdbc/LiferayPool`
pub fn from_resource_str(text: &str) -> Result<ConnectionConfig> {
    let root = ResourceNode::parse(text)
        .map_err(|e| DbCheckoError::config_read("invalid context file markup", e))?;
    tracing::debug!("Root element {}", root.tag);

    let resource = root
        .find_by_attribute(RESOURCE_TAG, "name", LIFERAY_POOL_RESOURCE_NAME)
        .ok_or_else(|| DbCheckoError::resource_not_found(LIFERAY_POOL_RESOURCE_NAME))?;
    tracing::debug!("Using Resource element {}", LIFERAY_POOL_RESOURCE_NAME);

    let attribute = |name: &str| resource.attribute(name).unwrap_or_default().to_string();

    Ok(ConnectionConfig::new(
        attribute("url"),
        attribute("username"),
        attribute("password"),
        attribute("driverClassName"),
    ))
}

/// Reads a context file and builds a [`ConnectionConfig`] from it.
///
/// # Errors
/// `ConfigRead` for unreadable files, otherwise as [`from_resource_str`].
pub fn from_resource_file(path: &Path) -> Result<ConnectionConfig> {
    tracing::debug!("Reading context file {}", path.display());

    let text = std::fs::read_to_string(path).map_err(|e| {
        DbCheckoError::config_read(format!("cannot read context file {}", path.display()), e)
    })?;

    from_resource_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Context path="" crossContext="true">
    <Resource name="jdbc/OtherPool" auth="Container" type="javax.sql.DataSource"
        url="jdbc:mysql://other/db" username="other" password="other"
        driverClassName="com.mysql.cj.jdbc.Driver"/>
    <Resource
        name="jdbc/LiferayPool"
        auth="Container"
        type="javax.sql.DataSource"
        driverClassName="org.postgresql.Driver"
        url="jdbc:postgresql://db:5432/lportal"
        username="liferay"
        password="s3cret"
        maxTotal="100"
    />
</Context>
"#;

    #[test]
    fn test_from_resource_str_selects_liferay_pool() {
        let config = from_resource_str(CONTEXT).unwrap();
        assert_eq!(config.url(), "jdbc:postgresql://db:5432/lportal");
        assert_eq!(config.user(), "liferay");
        assert_eq!(config.password(), "s3cret");
        assert_eq!(config.driver(), "org.postgresql.Driver");
    }

    #[test]
    fn test_missing_attributes_are_empty() {
        let config =
            from_resource_str(r#"<Context><Resource name="jdbc/LiferayPool" url="sqlite::memory:"/></Context>"#)
                .unwrap();
        assert_eq!(config.url(), "sqlite::memory:");
        assert_eq!(config.user(), "");
        assert_eq!(config.password(), "");
        assert_eq!(config.driver(), "");
    }

    #[test]
    fn test_no_matching_resource() {
        let result = from_resource_str(
            r#"<Context><Resource name="jdbc/OtherPool" url="x"/><Environment name="jdbc/LiferayPool"/></Context>"#,
        );
        assert!(matches!(
            result,
            Err(DbCheckoError::ResourceNotFound { ref name }) if name == LIFERAY_POOL_RESOURCE_NAME
        ));
    }

    #[test]
    fn test_malformed_markup_is_read_error() {
        let result = from_resource_str("<Context><Resource name=\"jdbc/LiferayPool\"></Context>");
        assert!(matches!(result, Err(DbCheckoError::ConfigRead { .. })));
    }

    #[test]
    fn test_nested_resource_found_in_document_order() {
        let root = ResourceNode::parse(
            r#"<Server>
                 <Service><Context><Resource name="jdbc/LiferayPool" url="first"/></Context></Service>
                 <Resource name="jdbc/LiferayPool" url="second"/>
               </Server>"#,
        )
        .unwrap();

        let found = root
            .find_by_attribute(RESOURCE_TAG, "name", LIFERAY_POOL_RESOURCE_NAME)
            .unwrap();
        assert_eq!(found.attribute("url"), Some("first"));
    }

    #[test]
    fn test_root_element_can_match() {
        let root = ResourceNode::parse(r#"<Resource name="jdbc/LiferayPool" url="root"/>"#).unwrap();
        let found = root.find(RESOURCE_TAG, |_| true).unwrap();
        assert_eq!(found.attribute("url"), Some("root"));
    }

    #[test]
    fn test_attribute_whitespace_is_normalized() {
        let config = from_resource_str(
            "<Context><Resource name=\"jdbc/LiferayPool\" url=\"jdbc:sqlite:\n/tmp/app.db\"/></Context>",
        )
        .unwrap();
        assert_eq!(config.url(), "jdbc:sqlite: /tmp/app.db");
    }

    #[test]
    fn test_doctype_is_accepted() {
        let config = from_resource_str(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE Context>\n<Context><Resource name=\"jdbc/LiferayPool\" url=\"u\"/></Context>",
        )
        .unwrap();
        assert_eq!(config.url(), "u");
    }
}
