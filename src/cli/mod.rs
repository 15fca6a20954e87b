//! CLI argument parsing types for the `signals` binary.

use clap::{ArgAction, Parser, Subcommand};

use crate::models::EntityListQuery;
use crate::types::EntityType;

/// Signals Notebook command-line interface.
#[derive(Parser, Debug)]
#[command(name = "signals", about = "Signals Notebook CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log more (`-v` debug, `-vv` trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log filter for the chosen verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single entity by its id (e.g. `experiment:<uuid>`).
    Get {
        eid: String,
    },

    /// List entities.
    List {
        /// Only these entity types, comma separated (e.g. `journal,experiment`).
        #[arg(long, value_delimiter = ',')]
        include_types: Vec<String>,

        /// Stop after this many entities.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Get a material (library, asset or batch) by its id.
    Material {
        mid: String,
    },

    /// List attributes.
    Attributes,

    /// List users.
    Users,

    /// Show the profile the API key belongs to.
    Whoami,
}

impl Command {
    /// Entity listing filter built from `list` arguments.
    pub fn entity_query(&self) -> EntityListQuery {
        match self {
            Command::List { include_types, .. } => EntityListQuery::default()
                .include_types(include_types.iter().map(|t| EntityType::from(t.as_str()))),
            _ => EntityListQuery::default(),
        }
    }
}
