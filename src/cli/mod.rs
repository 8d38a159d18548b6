//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "satkb",
    version,
    about = "Semantic retrieval engine for a hierarchical SAT study-notes knowledge base",
    long_about = "satkb indexes a subject/topic/subtopic tree of SAT study notes into a vector \
                  store via a hosted embedding API and serves subject-filtered semantic search, \
                  bounded context assembly for prompt construction, and an offline keyword \
                  fallback."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/satkb/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the vector index if the backing collection does not exist yet
    Index,

    /// Delete and rebuild the vector index from scratch
    Rebuild {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Search the knowledge base
    Search {
        /// Search query text
        query: String,

        /// Subject filter: math, english, or all
        #[arg(short, long, default_value = "all")]
        subject: String,

        /// Maximum number of results (defaults to retrieval.max_results)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Use the offline keyword index instead of semantic search
        #[arg(short, long)]
        keyword: bool,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Assemble a bounded context string for a query
    Context {
        /// Search query text
        query: String,

        /// Subject filter: math, english, or all
        #[arg(short, long, default_value = "all")]
        subject: String,

        /// Context budget in characters (defaults to retrieval.max_context_length)
        #[arg(short, long)]
        max_length: Option<usize>,
    },

    /// List available topics per subject
    Topics {
        /// Subject filter: math, english, or all
        #[arg(short, long, default_value = "all")]
        subject: String,
    },

    /// Show index statistics
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
