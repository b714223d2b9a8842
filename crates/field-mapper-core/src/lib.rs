//! # Field Mapper Core
//!
//! The generic field-mapping engine shared by every connector: an ordered
//! table of [`Link`]s pairing a field in an external source (a REST payload
//! key, a database column, a file attribute) with a field descriptor in the
//! search index schema.
//!
//! The engine is generic over both sides of a link. Each connector supplies
//! its own field types and three factory hooks through [`FieldHooks`]; the
//! engine owns ordering, lookup, mutation and the persisted `<map>` document.
//!
//! This crate contains no filesystem access, configuration or logging. Callers
//! hand it a reader or writer and decide where the bytes live.
//!
//! ```rust
//! use field_mapper_core::{FnHooks, ExactField, MappingTable, TargetNode};
//!
//! #[derive(Debug)]
//! struct Named(String);
//!
//! impl field_mapper_core::TargetField for Named {
//!     fn name(&self) -> &str {
//!         &self.0
//!     }
//! }
//!
//! let hooks = FnHooks::new(
//!     |raw| Ok(ExactField::new(raw)),
//!     |node: &TargetNode| Ok(Named(node.name().to_string())),
//!     |_target: &Named, _node: &mut TargetNode| {},
//! );
//! let mut table = MappingTable::new(hooks);
//! table
//!     .load_str(r#"<map><link source="title"><target name="doc_title"/></link></map>"#)
//!     .unwrap();
//! assert_eq!(table.len(), 1);
//! assert!(table.find_by_target_name("doc_title").is_some());
//! ```

mod document;
pub mod error;
pub mod field;
pub mod hooks;
pub mod link;
pub mod table;
pub mod target;

pub use error::{Error, HookError, HookKind, MappingError, ParseError, ParseErrorKind, Result};
pub use field::{ExactField, FoldedField, SourceField};
pub use hooks::{FieldHooks, FnHooks};
pub use link::{Link, LinkId};
pub use table::{LinkOf, MappingTable};
pub use target::{TargetField, TargetNode};
