//! Target field descriptors and their persisted element form.

use std::fmt::Debug;

use crate::error::HookError;

/// A field in the destination index schema, carrying connector-defined flags.
///
/// The engine only reads the name. Flags are interpreted by connector code.
pub trait TargetField: Debug {
    fn name(&self) -> &str;
}

/// One `<target>` element: its `name` plus every other attribute, in
/// document order.
///
/// Load hooks read flags from it; write hooks fill it in. Only the
/// connector knows what the extra attributes mean.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetNode {
    name: String,
    attrs: Vec<(String, String)>,
}

impl TargetNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes other than `name`, in order.
    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Reads a boolean flag. An absent flag is `false`.
    pub fn flag(&self, key: &str) -> Result<bool, HookError> {
        match self.attr(key) {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(HookError::new(format!(
                "attribute '{}' must be 'true' or 'false', got '{}'",
                key, other
            ))),
        }
    }

    /// Attribute keys not listed in `known`.
    pub fn unknown_attrs<'a>(&'a self, known: &[&str]) -> Vec<&'a str> {
        self.attrs
            .iter()
            .map(|(k, _)| k.as_str())
            .filter(|k| !known.contains(k))
            .collect()
    }

    /// Sets an attribute, replacing an existing value in place.
    ///
    /// `name` belongs to the node itself and is ignored here.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key == "name" {
            return;
        }
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Sets a flag. `false` flags are dropped rather than written.
    pub fn set_flag(&mut self, key: &str, value: bool) {
        if value {
            self.set(key, "true");
        } else {
            self.attrs.retain(|(k, _)| k != key);
        }
    }
}
