//! CursorKV CLI
//!
//! Command-line access to a single store file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cursorkv::{Context, Store, StoreConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// CursorKV CLI
#[derive(Parser, Debug)]
#[command(name = "cursorkv-cli")]
#[command(about = "CLI for CursorKV embedded key-value stores")]
#[command(version)]
struct Args {
    /// Store file
    #[arg(short, long, default_value = "./cursorkv.db")]
    path: String,

    /// Store name (shown in logs)
    #[arg(short, long, default_value = "cli")]
    name: String,

    /// Permission bits (octal) used if the file is created
    #[arg(short, long, default_value = "600", value_parser = parse_mode)]
    mode: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// List entries in key order
    Scan {
        /// Only keys starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Start at the first key >= this one
        #[arg(long)]
        seek: Option<String>,

        /// Maximum number of entries
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Rewrite the file to hold only live entries
    Compact,

    /// Delete the store file
    Destroy,
}

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info,cursorkv=debug";

fn parse_mode(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0o"), 8)
        .map_err(|e| format!("invalid octal mode {:?}: {}", s, e))
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> cursorkv::Result<ExitCode> {
    let config = StoreConfig::builder()
        .name(&args.name)
        .path(&args.path)
        .mode(args.mode)
        .build();
    let store = Store::open(config)?;
    let ctx = Context::background();

    match args.command {
        Commands::Get { key } => match store.get(&ctx).by_raw_key(&key).bytes()? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => return Ok(ExitCode::FAILURE),
        },
        Commands::Set { key, value } => {
            store.set(&ctx).by_raw_key(&key).string(&value)?;
        }
        Commands::Del { key } => {
            if !store.remove(&ctx).by_raw_key(&key).execute()? {
                tracing::info!(key = %key, "key not present");
            }
        }
        Commands::Scan {
            prefix,
            seek,
            limit,
        } => {
            let mut op = store.enumerate(&ctx);
            if let Some(prefix) = prefix {
                op = op.by_raw_prefix(prefix);
            }
            if let Some(seek) = seek {
                op = op.by_raw_seek(seek);
            }
            if let Some(limit) = limit {
                op = op.limit(limit);
            }
            op.visit(|entry| {
                println!(
                    "{}\t{}",
                    String::from_utf8_lossy(&entry.key),
                    String::from_utf8_lossy(&entry.value)
                );
                true
            })?;
        }
        Commands::Compact => store.compact(&ctx)?,
        Commands::Destroy => {
            store.destroy()?;
            return Ok(ExitCode::SUCCESS);
        }
    }

    store.close()?;
    Ok(ExitCode::SUCCESS)
}
