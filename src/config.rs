//! TOML configuration.
//!
//! Each connector instance gets a `[connectors.<type>.<name>]` section naming
//! its mapping document and, optionally, the index fields it may target.
//!
//! ```toml
//! [connectors.rest.products]
//! mapping = "mappings/products.xml"
//! schema_fields = ["content_url", "doc_title"]
//!
//! [connectors.database.orders]
//! mapping = "mappings/orders.xml"
//! case_sensitive = false
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub connectors: ConnectorsConfig,
    /// Directory of the configuration file. Relative mapping paths resolve
    /// against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConnectorsConfig {
    #[serde(default)]
    pub rest: BTreeMap<String, RestConnectorConfig>,
    #[serde(default)]
    pub database: BTreeMap<String, DatabaseConnectorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestConnectorConfig {
    pub mapping: PathBuf,
    #[serde(default)]
    pub schema_fields: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConnectorConfig {
    pub mapping: PathBuf,
    #[serde(default)]
    pub schema_fields: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl Config {
    /// Resolves a configured mapping path against the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.rest.len() + self.connectors.database.len()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config = parse_config(&content)?;
    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.connector_count() == 0 {
        bail!("no connectors configured: add a [connectors.rest.<name>] or [connectors.database.<name>] section");
    }

    for (name, rest) in &config.connectors.rest {
        validate_connector("rest", name, &rest.mapping, &rest.schema_fields)?;
    }
    for (name, db) in &config.connectors.database {
        validate_connector("database", name, &db.mapping, &db.schema_fields)?;
    }

    Ok(config)
}

fn validate_connector(kind: &str, name: &str, mapping: &Path, schema_fields: &[String]) -> Result<()> {
    if name.is_empty() || name.contains(':') {
        bail!("connectors.{}: invalid instance name '{}'", kind, name);
    }
    if mapping.as_os_str().is_empty() {
        bail!("connectors.{}.{}.mapping must not be empty", kind, name);
    }
    let mut seen = BTreeSet::new();
    for field in schema_fields {
        if field.trim().is_empty() {
            bail!("connectors.{}.{}.schema_fields contains an empty name", kind, name);
        }
        if !seen.insert(field.as_str()) {
            bail!(
                "connectors.{}.{}.schema_fields lists '{}' more than once",
                kind,
                name,
                field
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_connectors() {
        let config = parse_config(
            r#"
[connectors.rest.products]
mapping = "mappings/products.xml"
schema_fields = ["content_url", "doc_title"]

[connectors.database.orders]
mapping = "/srv/orders.xml"
case_sensitive = true
"#,
        )
        .unwrap();

        let rest = &config.connectors.rest["products"];
        assert_eq!(rest.schema_fields, vec!["content_url", "doc_title"]);
        let db = &config.connectors.database["orders"];
        assert!(db.case_sensitive);
        assert!(db.schema_fields.is_empty());
        assert_eq!(config.connector_count(), 2);
    }

    #[test]
    fn relative_mappings_resolve_against_config_dir() {
        let config = Config {
            base_dir: PathBuf::from("/etc/fmap"),
            ..Config::default()
        };
        assert_eq!(
            config.resolve(Path::new("maps/a.xml")),
            PathBuf::from("/etc/fmap/maps/a.xml")
        );
        assert_eq!(config.resolve(Path::new("/abs.xml")), PathBuf::from("/abs.xml"));
    }

    #[test]
    fn rejects_empty_config() {
        assert!(parse_config("").is_err());
    }

    #[test]
    fn rejects_duplicate_schema_fields() {
        let err = parse_config(
            r#"
[connectors.rest.products]
mapping = "p.xml"
schema_fields = ["a", "a"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_empty_mapping_path() {
        assert!(parse_config(
            r#"
[connectors.database.orders]
mapping = ""
"#
        )
        .is_err());
    }
}
