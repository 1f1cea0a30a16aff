//! # Cradle - Incubation Pipeline Server
//!
//! The main binary for the Cradle startup-incubation CRM.
//!
//! This application provides:
//! - HTTP REST API server (axum-based), one endpoint per lifecycle operation
//! - CLI interface for directory operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 apps/cradle (THE BINARY)                  │
//! │                                                           │
//! │   ┌─────────────┐              ┌─────────────┐            │
//! │   │   CLI       │              │   HTTP API  │            │
//! │   │  (clap)     │              │   (axum)    │            │
//! │   └──────┬──────┘              └──────┬──────┘            │
//! │          │                            │                   │
//! │          └──────────────┬─────────────┘                   │
//! │                         ▼                                 │
//! │                 ┌───────────────┐                         │
//! │                 │  cradle-core  │                         │
//! │                 │  (THE LOGIC)  │                         │
//! │                 └───────────────┘                         │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! cradle server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! cradle stats
//! cradle intake -f startups.json
//! cradle list --status Active --stage S1
//! ```

use clap::Parser;
use cradle::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing. CRADLE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CRADLE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cradle=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Cradle startup banner.
fn print_banner() {
    println!(
        r#"
   ██████╗██████╗  █████╗ ██████╗ ██╗     ███████╗
  ██╔════╝██╔══██╗██╔══██╗██╔══██╗██║     ██╔════╝
  ██║     ██████╔╝███████║██║  ██║██║     █████╗
  ██║     ██╔══██╗██╔══██║██║  ██║██║     ██╔══╝
  ╚██████╗██║  ██║██║  ██║██████╔╝███████╗███████╗
   ╚═════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚══════╝╚══════╝

  Incubation Pipeline Server v{}

  Validated • Attributed • Append-only
"#,
        env!("CARGO_PKG_VERSION")
    );
}
