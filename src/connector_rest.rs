//! REST connector field mapping.
//!
//! Maps keys of a REST payload to index fields. Payload keys are
//! case-sensitive. A target may carry the `crawlUrl` flag, marking the
//! field whose value is the canonical URL of the fetched resource; the
//! crawl scheduler checks [`CrawlUrlMapping::has_crawl_url`] to decide
//! whether that URL must be captured for link-following.

use field_mapper_core::{
    ExactField, FieldHooks, HookError, LinkOf, MappingTable, TargetField, TargetNode,
};

use crate::config::RestConnectorConfig;
use crate::schema::SchemaFields;

/// Persisted attribute for the crawl-URL flag.
pub const CRAWL_URL_ATTR: &str = "crawlUrl";

/// An index field fed from a REST payload key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestTarget {
    pub name: String,
    pub crawl_url: bool,
}

impl RestTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            crawl_url: false,
        }
    }

    pub fn crawl_url(mut self) -> Self {
        self.crawl_url = true;
        self
    }
}

impl TargetField for RestTarget {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory hooks for REST mappings.
#[derive(Debug, Clone, Default)]
pub struct RestHooks {
    schema: Option<SchemaFields>,
}

impl RestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: SchemaFields) -> Self {
        Self {
            schema: Some(schema),
        }
    }

    pub fn from_config(config: &RestConnectorConfig) -> Self {
        Self {
            schema: SchemaFields::from_config(&config.schema_fields),
        }
    }
}

impl FieldHooks for RestHooks {
    type Source = ExactField;
    type Target = RestTarget;

    fn load_source(&self, raw: &str) -> Result<ExactField, HookError> {
        Ok(ExactField::new(raw))
    }

    fn load_target(&self, node: &TargetNode) -> Result<RestTarget, HookError> {
        if let Some(attr) = node.unknown_attrs(&[CRAWL_URL_ATTR]).first() {
            return Err(HookError::new(format!(
                "unknown REST target attribute '{}'",
                attr
            )));
        }
        if let Some(schema) = &self.schema {
            schema.check(node.name())?;
        }
        Ok(RestTarget {
            name: node.name().to_string(),
            crawl_url: node.flag(CRAWL_URL_ATTR)?,
        })
    }

    fn write_target(&self, target: &RestTarget, node: &mut TargetNode) {
        node.set_flag(CRAWL_URL_ATTR, target.crawl_url);
    }
}

pub type RestMapping = MappingTable<RestHooks>;
pub type RestLink = LinkOf<RestHooks>;

/// Crawl-URL queries over a REST mapping.
pub trait CrawlUrlMapping {
    /// `true` iff at least one target carries the crawl-URL flag.
    fn has_crawl_url(&self) -> bool;

    /// First link, in table order, whose target carries the flag.
    fn crawl_url_link(&self) -> Option<&RestLink>;
}

impl CrawlUrlMapping for RestMapping {
    fn has_crawl_url(&self) -> bool {
        self.crawl_url_link().is_some()
    }

    fn crawl_url_link(&self) -> Option<&RestLink> {
        self.iter().find(|link| link.target().crawl_url)
    }
}
