//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// thrive - catalog-driven state tracking
#[derive(Parser, Debug)]
#[command(name = "thrive")]
#[command(version)]
#[command(about = "Inspect state catalogs and simulate milestone and manifestation workflows")]
pub struct Cli {
    /// Config file (defaults to $THRIVE_CONFIG, then ./thrive.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or validate state catalogs
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Apply a sequence of transitions to a fresh entity and print its history
    Simulate {
        /// Which workflow to simulate
        #[arg(value_enum)]
        domain: Domain,

        /// Target states, applied in order
        #[arg(required = true)]
        states: Vec<String>,

        /// Reason recorded on every transition
        #[arg(short, long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Print the catalog in effect for a domain
    Show {
        #[arg(value_enum)]
        domain: Domain,

        /// Output as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Validate a catalog file (TOML, YAML or JSON)
    Check {
        file: PathBuf,

        /// Also check the file can replace this domain's built-in catalog
        #[arg(long = "for", value_enum)]
        for_domain: Option<Domain>,
    },
}

/// Workflows with a built-in catalog.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Milestone,
    Manifestation,
}
