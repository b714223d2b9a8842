//! Index schema allow-lists.
//!
//! The mapping engine never looks at the index schema. Connectors that are
//! configured with `schema_fields` use a [`SchemaFields`] in their target
//! hook to reject names the index does not define.

use std::collections::BTreeSet;

use field_mapper_core::HookError;

/// Immutable set of field names defined by an index schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFields {
    fields: BTreeSet<String>,
}

impl SchemaFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// `None` for an empty list, meaning "no schema check".
    pub fn from_config(fields: &[String]) -> Option<Self> {
        if fields.is_empty() {
            None
        } else {
            Some(Self::new(fields.iter().cloned()))
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Hook helper: rejects a target name the schema does not define.
    pub fn check(&self, name: &str) -> Result<(), HookError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(HookError::new(format!(
                "'{}' is not a field of the index schema",
                name
            )))
        }
    }
}
