//! CLI module for Commentary.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Commentary - LLM-backed replies to YouTube comments
///
/// Filters, classifies and answers viewer comments in the creator's voice,
/// using the channel's own video transcripts as the primary source.
#[derive(Parser, Debug)]
#[command(name = "commentary")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draft a reply to a single comment
    Respond {
        /// The comment text
        comment: String,

        /// Print the full outcome (decisions and reply) as JSON
        #[arg(long)]
        json: bool,
    },

    /// Draft replies for a JSON array of comments
    Batch {
        /// JSON file containing an array of comment strings
        file: String,

        /// Write results as JSON to this file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Number of comments processed at once (defaults to pipeline.max_concurrent_comments)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Look up a query in the transcript corpus
    Search {
        /// Search query
        query: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

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

    /// Show configuration file path
    Path,
}
