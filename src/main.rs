//! # Field Mapper CLI (`fmap`)
//!
//! Inspects and edits the field mappings of configured crawler connectors.
//!
//! ## Usage
//!
//! ```bash
//! fmap --config ./config/fmap.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fmap sources` | List connectors and the status of their mappings |
//! | `fmap init <connector>` | Create an empty mapping document |
//! | `fmap show <connector>` | Print a mapping's links in order |
//! | `fmap check <connector>` | Validate a mapping and report overlaps and derived flags |
//! | `fmap export <connector>` | Export a mapping as JSON |
//! | `fmap link add <connector>` | Add a link |
//! | `fmap link remove <connector> <pos>` | Remove the link at a position |
//!
//! Connectors are addressed as `<type>:<name>`, e.g. `rest:products`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use field_mapper::commands::{self, NewLink};
use field_mapper::config;
use field_mapper::sources::{self, ConnectorSpec};

/// Field Mapper CLI — inspect and edit crawler connector field mappings.
#[derive(Parser)]
#[command(
    name = "fmap",
    about = "Field Mapper — inspect and edit crawler connector field mappings",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/fmap.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured connectors and their mapping status.
    Sources,

    /// Create an empty mapping document if none exists.
    Init {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,
    },

    /// Print a mapping's links in table order.
    Show {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,
    },

    /// Load a mapping and report fan-out, fan-in and connector flags.
    ///
    /// Exits non-zero if the mapping document is invalid.
    Check {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,
    },

    /// Export a mapping as JSON.
    Export {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Edit a mapping's links.
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Add a link. Appends unless `--at` is given.
    Add {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,

        /// Source field name.
        #[arg(long)]
        source: String,

        /// Target index field name.
        #[arg(long)]
        target: String,

        /// Target flags as `key=value` pairs (e.g. `crawlUrl=true`).
        #[arg(long = "flag", value_parser = parse_key_val)]
        flags: Vec<(String, String)>,

        /// Insert at this position instead of appending.
        #[arg(long)]
        at: Option<usize>,
    },

    /// Remove the link at a position (see `fmap show`).
    Remove {
        /// Connector as `<type>:<name>`.
        connector: ConnectorSpec,

        /// Zero-based position.
        position: usize,
    },
}

/// Parse a `key=value` pair for `--flag` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Init { connector } => {
            commands::run_init(&cfg, &connector)?;
        }
        Commands::Show { connector } => {
            commands::run_show(&cfg, &connector)?;
        }
        Commands::Check { connector } => {
            commands::run_check(&cfg, &connector)?;
        }
        Commands::Export { connector, output } => {
            commands::run_export_cmd(&cfg, &connector, output.as_deref())?;
        }
        Commands::Link { action } => match action {
            LinkAction::Add {
                connector,
                source,
                target,
                flags,
                at,
            } => {
                let new = NewLink {
                    source,
                    target,
                    flags,
                    at,
                };
                commands::run_link_add(&cfg, &connector, &new)?;
            }
            LinkAction::Remove {
                connector,
                position,
            } => {
                commands::run_link_remove(&cfg, &connector, position)?;
            }
        },
    }

    Ok(())
}
