//! Roadwork CLI
//!
//! Command-line tools for a file-backed roadwork document store.
//!
//! # Commands
//!
//! - `seed` - Populate an empty store with the demo dataset
//! - `status` - Show pending and total documents per collection
//! - `touch` - Flag one document as locally modified
//! - `block` - Record a blocked user under a fresh integer id
//! - `sync` - Run one sync through the HTTP handler and print the response
//!
//! Logs go to stderr so the JSON printed by `sync` can be piped.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Roadwork sync command-line tools.
#[derive(Parser)]
#[command(name = "roadwork")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate an empty store with the demo dataset
    Seed {
        /// Leave every document pending (`synchro = false`)
        #[arg(short, long)]
        pending: bool,
    },

    /// Show pending and total documents per collection
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Flag a document as locally modified
    Touch {
        /// Collection name, e.g. `signalements`
        collection: String,

        /// Document id
        id: String,
    },

    /// Block a user
    Block {
        /// Id of the user to block
        id_utilisateur: String,
    },

    /// Run one sync and print the JSON response
    Sync {
        /// Maximum updates per committed batch
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Pretty-print the response body
        #[arg(long)]
        pretty: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Seed { pending } => {
            let path = cli.store.ok_or("Store path required for seed")?;
            commands::seed::run(&path, pending)?;
        }
        Commands::Status { format } => {
            let path = cli.store.ok_or("Store path required for status")?;
            commands::status::run(&path, &format)?;
        }
        Commands::Touch { collection, id } => {
            let path = cli.store.ok_or("Store path required for touch")?;
            commands::touch::run(&path, &collection, &id)?;
        }
        Commands::Block { id_utilisateur } => {
            let path = cli.store.ok_or("Store path required for block")?;
            commands::block::run(&path, &id_utilisateur)?;
        }
        Commands::Sync { batch_size, pretty } => {
            let path = cli.store.ok_or("Store path required for sync")?;
            commands::sync::run(&path, batch_size, pretty)?;
        }
        Commands::Version => {
            println!("Roadwork CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
