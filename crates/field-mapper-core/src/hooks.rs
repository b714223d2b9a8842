//! Factory hooks: how a connector plugs its field types into the engine.
//!
//! A connector never subclasses the table. It hands the table a strategy
//! object that builds sources and targets while loading and renders targets
//! while writing. Adding a connector never touches the engine.

use std::fmt;

use crate::error::HookError;
use crate::field::SourceField;
use crate::target::{TargetField, TargetNode};

/// Connector-supplied construction and serialization of field types.
pub trait FieldHooks {
    type Source: SourceField;
    type Target: TargetField;

    /// Builds a source field from the `source` attribute of a `<link>`.
    fn load_source(&self, raw: &str) -> Result<Self::Source, HookError>;

    /// Builds a target descriptor from a `<target>` element.
    fn load_target(&self, node: &TargetNode) -> Result<Self::Target, HookError>;

    /// Writes the connector's flags for `target` into `node`.
    ///
    /// `node` arrives with its name already set to the target's name.
    fn write_target(&self, target: &Self::Target, node: &mut TargetNode);
}

/// [`FieldHooks`] assembled from three closures.
pub struct FnHooks<S, T, LS, LT, WT> {
    load_source: LS,
    load_target: LT,
    write_target: WT,
    _types: std::marker::PhantomData<fn() -> (S, T)>,
}

impl<S, T, LS, LT, WT> FnHooks<S, T, LS, LT, WT>
where
    S: SourceField,
    T: TargetField,
    LS: Fn(&str) -> Result<S, HookError>,
    LT: Fn(&TargetNode) -> Result<T, HookError>,
    WT: Fn(&T, &mut TargetNode),
{
    pub fn new(load_source: LS, load_target: LT, write_target: WT) -> Self {
        Self {
            load_source,
            load_target,
            write_target,
            _types: std::marker::PhantomData,
        }
    }
}

impl<S, T, LS, LT, WT> FieldHooks for FnHooks<S, T, LS, LT, WT>
where
    S: SourceField,
    T: TargetField,
    LS: Fn(&str) -> Result<S, HookError>,
    LT: Fn(&TargetNode) -> Result<T, HookError>,
    WT: Fn(&T, &mut TargetNode),
{
    type Source = S;
    type Target = T;

    fn load_source(&self, raw: &str) -> Result<S, HookError> {
        (self.load_source)(raw)
    }

    fn load_target(&self, node: &TargetNode) -> Result<T, HookError> {
        (self.load_target)(node)
    }

    fn write_target(&self, target: &T, node: &mut TargetNode) {
        (self.write_target)(target, node)
    }
}

impl<S, T, LS, LT, WT> fmt::Debug for FnHooks<S, T, LS, LT, WT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHooks").finish_non_exhaustive()
    }
}
