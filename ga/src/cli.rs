//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gemini Architect - conversational project planning with a live roadmap
#[derive(Debug, Parser)]
#[command(
    name = "ga",
    about = "Conversational project architect with a live roadmap, backed by Gemini",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive session (default)
    Chat {
        /// Restore a saved session first
        #[arg(long, value_name = "SNAPSHOT")]
        load: Option<PathBuf>,

        /// First message to send
        task: Option<String>,
    },

    /// Send one message and print the reply and roadmap
    Ask {
        /// Message to send
        message: String,

        /// Restore a saved session first
        #[arg(long, value_name = "SNAPSHOT")]
        load: Option<PathBuf>,

        /// Save the session afterwards
        #[arg(long, value_name = "SNAPSHOT")]
        save: Option<PathBuf>,
    },

    /// Print the roadmap stored in a snapshot
    Roadmap {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },

    /// Print the conversation stored in a snapshot
    History {
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,
    },
}
