//! ArborDB CLI
//!
//! Command-line front end for an ArborDB namespace.
//!
//! # Commands
//!
//! - `get` - Show a document and the names stored beneath it
//! - `set` / `patch` - Write a document built from `key=value` pairs
//! - `list` - List the children of a folder
//! - `delete` / `delete-folder` - Remove documents
//! - `exists` - Check whether a document exists
//! - `reindex` - Rebuild the indexes of a folder

mod commands;

use arbordb_core::{Config, Database};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ArborDB hierarchical document database.
#[derive(Parser)]
#[command(name = "arbordb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root directory of the namespace
    #[arg(global = true, short, long, default_value = "_data")]
    root: PathBuf,

    /// Use an ephemeral in-memory namespace instead of `--root`
    #[arg(global = true, long)]
    memory: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a document and its children
    Get {
        /// Document identifier (empty for the root)
        #[arg(default_value = "")]
        id: String,
    },

    /// Replace a document
    Set {
        /// Document identifier
        id: String,

        /// Fields as key=value; values are parsed as JSON, else taken as text
        fields: Vec<String>,

        /// JSON object used as the document body before applying fields
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Merge fields into a document, creating it if missing
    Patch {
        /// Document identifier
        id: String,

        /// Fields as key=value; values are parsed as JSON, else taken as text
        fields: Vec<String>,

        /// JSON object merged before applying fields
        #[arg(short, long)]
        body: Option<String>,
    },

    /// List the children of a folder
    List {
        /// Folder identifier (empty for the root)
        #[arg(default_value = "")]
        folder: String,
    },

    /// Delete a document
    Delete {
        /// Document identifier
        id: String,
    },

    /// Delete a folder and everything beneath it
    DeleteFolder {
        /// Folder identifier
        folder: String,
    },

    /// Check whether a document exists
    Exists {
        /// Document identifier
        id: String,
    },

    /// Rebuild every index defined in a folder
    Reindex {
        /// Folder identifier (empty for the root)
        #[arg(default_value = "")]
        folder: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("ArborDB CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("ArborDB Core v{}", arbordb_core::VERSION);
        return Ok(());
    }

    let db = if cli.memory {
        Database::open_in_memory()?
    } else {
        Database::open_with_config(&cli.root, Config::default())?
    };

    let output = match cli.command {
        Commands::Get { id } => commands::document::get(&db, &id)?,
        Commands::Set { id, fields, body } => {
            commands::document::set(&db, &id, &fields, body.as_deref())?
        }
        Commands::Patch { id, fields, body } => {
            commands::document::patch(&db, &id, &fields, body.as_deref())?
        }
        Commands::List { folder } => commands::folder::list(&db, &folder)?,
        Commands::Delete { id } => commands::document::delete(&db, &id)?,
        Commands::DeleteFolder { folder } => commands::folder::delete(&db, &folder)?,
        Commands::Exists { id } => commands::document::exists(&db, &id)?,
        Commands::Reindex { folder } => commands::folder::reindex(&db, &folder)?,
        Commands::Version => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
