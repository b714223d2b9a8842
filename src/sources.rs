//! Connector addressing and status listing.
//!
//! Connectors are addressed as `<type>:<name>` (`rest:products`,
//! `database:orders`), matching their `[connectors.<type>.<name>]` section.

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Config;
use crate::connector_db::{DatabaseHooks, PrimaryKeyMapping};
use crate::connector_rest::{CrawlUrlMapping, RestHooks};
use crate::mapping_file::open_mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Rest,
    Database,
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorKind::Rest => write!(f, "rest"),
            ConnectorKind::Database => write!(f, "database"),
        }
    }
}

/// A `<type>:<name>` connector reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorSpec {
    pub kind: ConnectorKind,
    pub name: String,
}

impl FromStr for ConnectorSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("connector must be <type>:<name>, got '{}'", s))?;
        let kind = match kind {
            "rest" => ConnectorKind::Rest,
            "database" => ConnectorKind::Database,
            other => bail!(
                "Unknown connector type: '{}'. Must be rest or database.",
                other
            ),
        };
        if name.is_empty() {
            bail!("connector name missing in '{}'", s);
        }
        Ok(Self {
            kind,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ConnectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// A configured connector with its hooks built from config.
pub enum Connector {
    Rest { mapping: PathBuf, hooks: RestHooks },
    Database { mapping: PathBuf, hooks: DatabaseHooks },
}

impl Connector {
    pub fn resolve(config: &Config, spec: &ConnectorSpec) -> Result<Self> {
        match spec.kind {
            ConnectorKind::Rest => {
                let rest = config
                    .connectors
                    .rest
                    .get(&spec.name)
                    .ok_or_else(|| anyhow!("Connector not configured: {}", spec))?;
                Ok(Connector::Rest {
                    mapping: config.resolve(&rest.mapping),
                    hooks: RestHooks::from_config(rest),
                })
            }
            ConnectorKind::Database => {
                let db = config
                    .connectors
                    .database
                    .get(&spec.name)
                    .ok_or_else(|| anyhow!("Connector not configured: {}", spec))?;
                Ok(Connector::Database {
                    mapping: config.resolve(&db.mapping),
                    hooks: DatabaseHooks::from_config(db),
                })
            }
        }
    }

    pub fn mapping_path(&self) -> &PathBuf {
        match self {
            Connector::Rest { mapping, .. } | Connector::Database { mapping, .. } => mapping,
        }
    }
}

/// Mapping status of a single connector.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    /// `<type>:<name>`.
    pub name: String,
    /// `OK`, `MISSING` (no mapping file yet) or `INVALID`.
    pub status: &'static str,
    pub links: usize,
    /// Connector-specific summary, e.g. `crawl-url: content_url`.
    pub notes: Option<String>,
}

/// Loads every configured mapping and reports its status.
pub fn get_sources(config: &Config) -> Vec<SourceStatus> {
    let mut sources = Vec::new();

    for name in config.connectors.rest.keys() {
        let spec = ConnectorSpec {
            kind: ConnectorKind::Rest,
            name: name.clone(),
        };
        sources.push(status_of(config, &spec));
    }
    for name in config.connectors.database.keys() {
        let spec = ConnectorSpec {
            kind: ConnectorKind::Database,
            name: name.clone(),
        };
        sources.push(status_of(config, &spec));
    }

    sources
}

fn status_of(config: &Config, spec: &ConnectorSpec) -> SourceStatus {
    let name = spec.to_string();
    let connector = match Connector::resolve(config, spec) {
        Ok(c) => c,
        Err(e) => return invalid(name, e),
    };
    if !connector.mapping_path().exists() {
        return SourceStatus {
            name,
            status: "MISSING",
            links: 0,
            notes: Some(format!("no file at {}", connector.mapping_path().display())),
        };
    }

    let loaded = match connector {
        Connector::Rest { mapping, hooks } => open_mapping(&mapping, hooks).map(|table| {
            let notes = match table.crawl_url_link() {
                Some(link) => format!("crawl-url: {}", link.target().name),
                None => "crawl-url: none".to_string(),
            };
            (table.len(), notes)
        }),
        Connector::Database { mapping, hooks } => open_mapping(&mapping, hooks).map(|table| {
            let notes = match table.primary_key_link() {
                Some(link) => format!("primary-key: {}", link.target().name),
                None => "primary-key: none".to_string(),
            };
            (table.len(), notes)
        }),
    };

    match loaded {
        Ok((links, notes)) => SourceStatus {
            name,
            status: "OK",
            links,
            notes: Some(notes),
        },
        Err(e) => invalid(name, e),
    }
}

fn invalid(name: String, e: anyhow::Error) -> SourceStatus {
    SourceStatus {
        name,
        status: "INVALID",
        links: 0,
        notes: Some(format!("{:#}", e)),
    }
}

/// CLI entry point for `fmap sources`.
pub fn list_sources(config: &Config) -> Result<()> {
    let sources = get_sources(config);

    println!("{:<24} {:<8} {:>5}  NOTES", "CONNECTOR", "STATUS", "LINKS");
    for s in &sources {
        println!(
            "{:<24} {:<8} {:>5}  {}",
            s.name,
            s.status,
            s.links,
            s.notes.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn parses_connector_specs() {
        let spec: ConnectorSpec = "rest:products".parse().unwrap();
        assert_eq!(spec.kind, ConnectorKind::Rest);
        assert_eq!(spec.name, "products");
        assert_eq!(spec.to_string(), "rest:products");

        assert!("products".parse::<ConnectorSpec>().is_err());
        assert!("ftp:products".parse::<ConnectorSpec>().is_err());
        assert!("rest:".parse::<ConnectorSpec>().is_err());
    }

    #[test]
    fn reports_mapping_status() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("products.xml"),
            r#"<map><link source="url"><target name="content_url" crawlUrl="true"/></link></map>"#,
        )
        .unwrap();
        std::fs::write(tmp.path().join("broken.xml"), "<map>").unwrap();

        let mut config = parse_config(
            r#"
[connectors.rest.products]
mapping = "products.xml"

[connectors.rest.broken]
mapping = "broken.xml"

[connectors.database.orders]
mapping = "orders.xml"
"#,
        )
        .unwrap();
        config.base_dir = tmp.path().to_path_buf();

        let sources = get_sources(&config);
        let by_name = |n: &str| sources.iter().find(|s| s.name == n).unwrap();

        let products = by_name("rest:products");
        assert_eq!(products.status, "OK");
        assert_eq!(products.links, 1);
        assert_eq!(products.notes.as_deref(), Some("crawl-url: content_url"));

        assert_eq!(by_name("rest:broken").status, "INVALID");
        assert_eq!(by_name("database:orders").status, "MISSING");
    }
}
