//! KeyStash CLI
//!
//! Command-line tools for inspecting and editing a KeyStash store file.
//!
//! # Commands
//!
//! - `get` - Print a value
//! - `set` - Store a value
//! - `delete` - Remove a key
//! - `list` - List keys with their value lengths
//! - `check` - Verify every value decodes

mod commands;

use clap::{Parser, Subcommand};
use commands::{InputEncoding, OutputEncoding};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// KeyStash command-line store tools.
#[derive(Parser)]
#[command(name = "keystash")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long, env = "KEYSTASH_PATH")]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        /// Key to read
        key: String,

        /// How to print the value
        #[arg(short, long, value_enum, default_value_t = OutputEncoding::Base64)]
        encoding: OutputEncoding,
    },

    /// Store a value under a key
    Set {
        /// Key to write
        key: String,

        /// Value to store (omit when using --file)
        #[arg(required_unless_present = "file")]
        value: Option<String>,

        /// How the value argument is encoded
        #[arg(short, long, value_enum, default_value_t = InputEncoding::Utf8)]
        encoding: InputEncoding,

        /// Read the raw value from a file instead
        #[arg(short, long, conflicts_with = "value")]
        file: Option<PathBuf>,
    },

    /// Remove a key (succeeds if the key is absent)
    Delete {
        /// Key to remove
        key: String,
    },

    /// List keys and value lengths
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Verify that every stored value decodes
    Check,

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

    match cli.command {
        Commands::Get { key, encoding } => {
            let path = cli.path.ok_or("Store path required for get")?;
            commands::get::run(&path, &key, encoding)?;
        }
        Commands::Set {
            key,
            value,
            encoding,
            file,
        } => {
            let path = cli.path.ok_or("Store path required for set")?;
            let input = match (value, file) {
                (_, Some(file)) => commands::set::Input::File(file),
                (Some(value), None) => commands::set::Input::Arg(value, encoding),
                (None, None) => return Err("a value or --file is required".into()),
            };
            commands::set::run(&path, &key, input)?;
        }
        Commands::Delete { key } => {
            let path = cli.path.ok_or("Store path required for delete")?;
            commands::delete::run(&path, &key)?;
        }
        Commands::List { format } => {
            let path = cli.path.ok_or("Store path required for list")?;
            commands::list::run(&path, &format)?;
        }
        Commands::Check => {
            let path = cli.path.ok_or("Store path required for check")?;
            commands::check::run(&path)?;
        }
        Commands::Version => {
            println!("KeyStash CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("KeyStash Core v{}", keystash_core::VERSION);
        }
    }

    Ok(())
}
