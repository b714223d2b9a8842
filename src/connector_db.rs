//! Database connector field mapping.
//!
//! Maps result-set columns to index fields. Column names compare
//! case-insensitively unless the connector is configured otherwise. Targets
//! may be flagged `primaryKey` (the column that identifies the row in the
//! index) and `multiValued` (the column is split into several values).

use std::borrow::Cow;

use field_mapper_core::{
    FieldHooks, HookError, LinkOf, MappingTable, SourceField, TargetField, TargetNode,
};

use crate::config::DatabaseConnectorConfig;
use crate::schema::SchemaFields;

pub const PRIMARY_KEY_ATTR: &str = "primaryKey";
pub const MULTI_VALUED_ATTR: &str = "multiValued";

/// A result-set column name, compared under the connector's case policy.
#[derive(Debug, Clone)]
pub struct ColumnField {
    name: String,
    key: String,
}

impl ColumnField {
    pub fn new(name: impl Into<String>, case_sensitive: bool) -> Self {
        let name = name.into();
        let key = if case_sensitive {
            name.clone()
        } else {
            name.to_lowercase()
        };
        Self { name, key }
    }
}

impl PartialEq for ColumnField {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ColumnField {}

impl SourceField for ColumnField {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub name: String,
    pub primary_key: bool,
    pub multi_valued: bool,
}

impl DatabaseTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: false,
            multi_valued: false,
        }
    }
}

impl TargetField for DatabaseTarget {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Factory hooks for database mappings.
#[derive(Debug, Clone, Default)]
pub struct DatabaseHooks {
    schema: Option<SchemaFields>,
    case_sensitive: bool,
}

impl DatabaseHooks {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            schema: None,
            case_sensitive,
        }
    }

    pub fn with_schema(mut self, schema: SchemaFields) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn from_config(config: &DatabaseConnectorConfig) -> Self {
        Self {
            schema: SchemaFields::from_config(&config.schema_fields),
            case_sensitive: config.case_sensitive,
        }
    }

    /// Builds a column under this connector's case policy.
    pub fn column(&self, name: impl Into<String>) -> ColumnField {
        ColumnField::new(name, self.case_sensitive)
    }
}

impl FieldHooks for DatabaseHooks {
    type Source = ColumnField;
    type Target = DatabaseTarget;

    fn load_source(&self, raw: &str) -> Result<ColumnField, HookError> {
        if raw.trim().is_empty() {
            return Err(HookError::new("column name must not be blank"));
        }
        Ok(self.column(raw))
    }

    fn load_target(&self, node: &TargetNode) -> Result<DatabaseTarget, HookError> {
        if let Some(attr) = node
            .unknown_attrs(&[PRIMARY_KEY_ATTR, MULTI_VALUED_ATTR])
            .first()
        {
            return Err(HookError::new(format!(
                "unknown database target attribute '{}'",
                attr
            )));
        }
        if let Some(schema) = &self.schema {
            schema.check(node.name())?;
        }
        let primary_key = node.flag(PRIMARY_KEY_ATTR)?;
        let multi_valued = node.flag(MULTI_VALUED_ATTR)?;
        if primary_key && multi_valued {
            return Err(HookError::new("a primary key cannot be multi-valued"));
        }
        Ok(DatabaseTarget {
            name: node.name().to_string(),
            primary_key,
            multi_valued,
        })
    }

    fn write_target(&self, target: &DatabaseTarget, node: &mut TargetNode) {
        node.set_flag(PRIMARY_KEY_ATTR, target.primary_key);
        node.set_flag(MULTI_VALUED_ATTR, target.multi_valued);
    }
}

pub type DatabaseMapping = MappingTable<DatabaseHooks>;
pub type DatabaseLink = LinkOf<DatabaseHooks>;

/// Key and multi-value queries over a database mapping.
pub trait PrimaryKeyMapping {
    /// First link, in table order, whose target is the primary key.
    fn primary_key_link(&self) -> Option<&DatabaseLink>;

    /// Names of multi-valued targets, in table order.
    fn multi_valued_targets(&self) -> Vec<&str>;
}

impl PrimaryKeyMapping for DatabaseMapping {
    fn primary_key_link(&self) -> Option<&DatabaseLink> {
        self.iter().find(|link| link.target().primary_key)
    }

    fn multi_valued_targets(&self) -> Vec<&str> {
        self.iter()
            .filter(|link| link.target().multi_valued)
            .map(|link| link.target().name.as_str())
            .collect()
    }
}
