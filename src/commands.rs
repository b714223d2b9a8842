//! CLI command implementations.
//!
//! Every command resolves a `<type>:<name>` connector from config, loads its
//! mapping with the connector's hooks, and works on the generic table. Edits
//! are saved atomically before the command returns.

use anyhow::{Context, Result};
use std::path::Path;

use field_mapper_core::{FieldHooks, MappingTable, SourceField, TargetField, TargetNode};

use crate::config::Config;
use crate::connector_db::PrimaryKeyMapping;
use crate::connector_rest::CrawlUrlMapping;
use crate::export::run_export;
use crate::mapping_file::{init_mapping, open_mapping, save_mapping};
use crate::sources::{Connector, ConnectorSpec};

/// Sources or targets that appear in more than one link.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Overlaps {
    /// `(source name, link count)` for sources feeding several targets.
    pub fan_out: Vec<(String, usize)>,
    /// `(target name, link count)` for targets fed by several sources.
    pub fan_in: Vec<(String, usize)>,
}

/// Finds fan-out and fan-in, reported in order of first appearance.
pub fn overlaps<H: FieldHooks>(table: &MappingTable<H>) -> Overlaps {
    let mut sources: Vec<(String, String, usize)> = Vec::new();
    let mut targets: Vec<(String, usize)> = Vec::new();

    for link in table {
        let key = link.source().key().into_owned();
        match sources.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2 += 1,
            None => sources.push((key, link.source().name().to_string(), 1)),
        }
        let target = link.target().name();
        match targets.iter_mut().find(|(t, _)| t.as_str() == target) {
            Some(entry) => entry.1 += 1,
            None => targets.push((target.to_string(), 1)),
        }
    }

    Overlaps {
        fan_out: sources
            .into_iter()
            .filter(|(_, _, n)| *n > 1)
            .map(|(_, name, n)| (name, n))
            .collect(),
        fan_in: targets.into_iter().filter(|(_, n)| *n > 1).collect(),
    }
}

fn format_node(node: &TargetNode) -> String {
    node.attrs()
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_links<H: FieldHooks>(table: &MappingTable<H>) {
    println!("{:>4}  {:<24} {:<24} FLAGS", "POS", "SOURCE", "TARGET");
    for (pos, link) in table.iter().enumerate() {
        let node = table.target_node(link);
        println!(
            "{:>4}  {:<24} {:<24} {}",
            pos,
            link.source().name(),
            node.name(),
            format_node(&node)
        );
    }
}

fn print_check<H: FieldHooks>(table: &MappingTable<H>, derived: &str) {
    let found = overlaps(table);
    println!("links:    {}", table.len());
    if found.fan_out.is_empty() {
        println!("fan-out:  none");
    } else {
        for (name, n) in &found.fan_out {
            println!("fan-out:  {} -> {} targets", name, n);
        }
    }
    if found.fan_in.is_empty() {
        println!("fan-in:   none");
    } else {
        for (name, n) in &found.fan_in {
            println!("fan-in:   {} <- {} sources", name, n);
        }
    }
    println!("{}", derived);
}

/// `fmap init`
pub fn run_init(config: &Config, spec: &ConnectorSpec) -> Result<()> {
    let created = match Connector::resolve(config, spec)? {
        Connector::Rest { mapping, hooks } => (init_mapping(&mapping, hooks)?, mapping),
        Connector::Database { mapping, hooks } => (init_mapping(&mapping, hooks)?, mapping),
    };
    match created {
        (true, path) => eprintln!("Created empty mapping {}", path.display()),
        (false, path) => eprintln!("Mapping already exists: {}", path.display()),
    }
    Ok(())
}

/// `fmap show`
pub fn run_show(config: &Config, spec: &ConnectorSpec) -> Result<()> {
    match Connector::resolve(config, spec)? {
        Connector::Rest { mapping, hooks } => print_links(&open_mapping(&mapping, hooks)?),
        Connector::Database { mapping, hooks } => print_links(&open_mapping(&mapping, hooks)?),
    }
    Ok(())
}

/// `fmap check`
pub fn run_check(config: &Config, spec: &ConnectorSpec) -> Result<()> {
    match Connector::resolve(config, spec)? {
        Connector::Rest { mapping, hooks } => {
            let table = open_mapping(&mapping, hooks)?;
            let derived = match table.crawl_url_link() {
                Some(link) => format!(
                    "crawl-url: {} (from {})",
                    link.target().name,
                    link.source().name()
                ),
                None => "crawl-url: none".to_string(),
            };
            print_check(&table, &derived);
        }
        Connector::Database { mapping, hooks } => {
            let table = open_mapping(&mapping, hooks)?;
            let mut derived = match table.primary_key_link() {
                Some(link) => format!(
                    "primary-key: {} (from {})",
                    link.target().name,
                    link.source().name()
                ),
                None => "primary-key: none".to_string(),
            };
            let multi = table.multi_valued_targets();
            if !multi.is_empty() {
                derived.push_str(&format!("\nmulti-valued: {}", multi.join(", ")));
            }
            print_check(&table, &derived);
        }
    }
    Ok(())
}

/// `fmap export`
pub fn run_export_cmd(config: &Config, spec: &ConnectorSpec, output: Option<&Path>) -> Result<()> {
    match Connector::resolve(config, spec)? {
        Connector::Rest { mapping, hooks } => run_export(&open_mapping(&mapping, hooks)?, output),
        Connector::Database { mapping, hooks } => {
            run_export(&open_mapping(&mapping, hooks)?, output)
        }
    }
}

/// A link to add, in persisted form.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub source: String,
    pub target: String,
    pub flags: Vec<(String, String)>,
    pub at: Option<usize>,
}

fn add_link<H: FieldHooks>(path: &Path, hooks: H, new: &NewLink) -> Result<usize> {
    let mut table = open_mapping(path, hooks)?;
    let mut node = TargetNode::new(new.target.as_str());
    for (key, value) in &new.flags {
        node.set(key.as_str(), value.as_str());
    }
    let link = table
        .link_from_node(&new.source, &node)
        .with_context(|| format!("Cannot add {} -> {}", new.source, new.target))?;
    let position = match new.at {
        Some(index) => {
            table.insert_at(index, link)?;
            index
        }
        None => {
            table.add(link);
            table.len() - 1
        }
    };
    save_mapping(path, &table)?;
    Ok(position)
}

/// `fmap link add`
pub fn run_link_add(config: &Config, spec: &ConnectorSpec, new: &NewLink) -> Result<()> {
    let connector = Connector::resolve(config, spec)?;
    let position = match connector {
        Connector::Rest { mapping, hooks } => add_link(&mapping, hooks, new)?,
        Connector::Database { mapping, hooks } => add_link(&mapping, hooks, new)?,
    };
    eprintln!(
        "Added {} -> {} at position {} in {}",
        new.source, new.target, position, spec
    );
    Ok(())
}

fn remove_link<H: FieldHooks>(path: &Path, hooks: H, position: usize) -> Result<(String, String)> {
    let mut table = open_mapping(path, hooks)?;
    let removed = table.remove_at(position)?;
    save_mapping(path, &table)?;
    Ok((
        removed.source().name().to_string(),
        removed.target().name().to_string(),
    ))
}

/// `fmap link remove`
pub fn run_link_remove(config: &Config, spec: &ConnectorSpec, position: usize) -> Result<()> {
    let (source, target) = match Connector::resolve(config, spec)? {
        Connector::Rest { mapping, hooks } => remove_link(&mapping, hooks, position)?,
        Connector::Database { mapping, hooks } => remove_link(&mapping, hooks, position)?,
    };
    eprintln!(
        "Removed {} -> {} from position {} in {}",
        source, target, position, spec
    );
    Ok(())
}
