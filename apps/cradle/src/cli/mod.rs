//! # Cradle CLI Module
//!
//! This module implements the CLI interface for Cradle.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `list` - List startups (filterable)
//! - `show` - Show one startup with full history
//! - `stats` - Show portfolio statistics
//! - `intake` - Register startups from a JSON file
//! - `export` - Export the directory as JSON
//! - `init` - Initialize a new database

mod commands;

use clap::{Parser, Subcommand};
use cradle_core::{CradleError, Stage, Status};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cradle - Incubation Pipeline Server
///
/// Tracks startups through intake, pitch rounds, mentorship, onboarding,
/// and graduation. Every lifecycle change is validated and attributed.
#[derive(Parser, Debug)]
#[command(name = "cradle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the startup database
    #[arg(short = 'D', long, global = true, default_value = "cradle.db")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// List startups
    List {
        /// Filter by stage (S0, S1, S2, S3, One-on-One)
        #[arg(long)]
        stage: Option<Stage>,

        /// Filter by status (Active, Onboarded, Graduated, Rejected)
        #[arg(long)]
        status: Option<Status>,

        /// Case-insensitive search over name, founder, and email
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a single startup with its full history
    Show {
        /// Startup id
        id: u64,
    },

    /// Show portfolio statistics
    Stats,

    /// Register startups from a JSON file (single form or array of forms)
    Intake {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export the full directory as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CradleError> {
    let backend = cli.backend.as_str();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            cmd_server(&cli.database, backend, &host, port).await
        }
        Some(Commands::List {
            stage,
            status,
            search,
        }) => cmd_list(&cli.database, backend, json_mode, stage, status, search),
        Some(Commands::Show { id }) => cmd_show(&cli.database, backend, id),
        Some(Commands::Stats) => cmd_stats(&cli.database, backend, json_mode),
        Some(Commands::Intake { file }) => cmd_intake(&cli.database, backend, json_mode, &file),
        Some(Commands::Export { output }) => cmd_export(&cli.database, backend, &output),
        Some(Commands::Init { force }) => cmd_init(&cli.database, backend, force),
        None => {
            // No subcommand - show stats by default
            cmd_stats(&cli.database, backend, json_mode)
        }
    }
}
