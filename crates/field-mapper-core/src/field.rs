//! Source field identifiers.
//!
//! A source field names one field in an external data source. How names are
//! compared is up to the connector: REST payload keys are case-sensitive,
//! SQL column names usually are not. The engine only ever compares fields
//! through [`SourceField::key`].

use std::borrow::Cow;
use std::fmt::Debug;

/// A name-addressable field in an external data source.
pub trait SourceField: Debug {
    /// The name as it appears in the persisted mapping.
    fn name(&self) -> &str;

    /// Normalized comparison key. Defaults to the name itself.
    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name())
    }

    /// Whether two fields address the same source field.
    fn matches(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.key() == other.key()
    }
}

/// Case-sensitive source field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactField {
    name: String,
}

impl ExactField {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SourceField for ExactField {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive source field. The original spelling is kept for writing.
#[derive(Debug, Clone)]
pub struct FoldedField {
    name: String,
    folded: String,
}

impl FoldedField {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let folded = name.to_lowercase();
        Self { name, folded }
    }
}

impl SourceField for FoldedField {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.folded)
    }
}

impl PartialEq for FoldedField {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for FoldedField {}
