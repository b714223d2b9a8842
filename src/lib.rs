//! # Field Mapper
//!
//! Connector field mappings for search crawlers.
//!
//! Every crawler connector pairs fields of its data source with fields of the
//! search index. Field Mapper keeps those pairings in ordered `<map>`
//! documents, one per connector instance, loaded through the generic engine
//! in [`field_mapper_core`] with hooks supplied by each connector.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐   ┌────────────┐
//! │  Connectors  │──▶│  MappingTable<H>   │◀─▶│ <map> file │
//! │  REST / DB   │   │  (core, generic)   │   │  (atomic)  │
//! └──────┬───────┘   └────────────────────┘   └────────────┘
//!        │ derived queries (crawl URL, primary key)
//!        ▼
//!   crawl scheduling / indexing
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`schema`] | Index field allow-lists used by connector hooks |
//! | [`connector_rest`] | REST payload mappings and the crawl-URL predicate |
//! | [`connector_db`] | Database column mappings and key queries |
//! | [`mapping_file`] | Loading and atomically saving mapping documents |
//! | [`export`] | JSON export of a mapping |
//! | [`sources`] | Connector addressing and status listing |
//! | [`commands`] | CLI command implementations |

pub mod commands;
pub mod config;
pub mod connector_db;
pub mod connector_rest;
pub mod export;
pub mod mapping_file;
pub mod schema;
pub mod sources;
