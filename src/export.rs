//! Export a mapping as JSON.
//!
//! Targets are rendered through the connector's write hook, so the export
//! shows exactly the flags that would be persisted without knowing what any
//! of them mean.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use field_mapper_core::{FieldHooks, MappingTable, SourceField};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ExportLink {
    pub position: usize,
    pub source: String,
    pub target: String,
    pub attributes: BTreeMap<String, String>,
}

pub fn export_links<H: FieldHooks>(table: &MappingTable<H>) -> Vec<ExportLink> {
    table
        .iter()
        .enumerate()
        .map(|(position, link)| {
            let node = table.target_node(link);
            ExportLink {
                position,
                source: link.source().name().to_string(),
                target: node.name().to_string(),
                attributes: node.attrs().iter().cloned().collect(),
            }
        })
        .collect()
}

/// Export a mapping as pretty JSON.
///
/// If `output` is `Some`, writes to that file path. Otherwise writes to
/// stdout for piping.
pub fn run_export<H: FieldHooks>(table: &MappingTable<H>, output: Option<&Path>) -> Result<()> {
    let links = export_links(table);
    let json = serde_json::to_string_pretty(&links)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            eprintln!("Exported {} links to {}", links.len(), path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
