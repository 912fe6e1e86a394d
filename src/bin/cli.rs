//! MementoKV CLI
//!
//! Command-line interface for a MementoKV data directory.

use clap::{Parser, Subcommand};
use mementokv::config::DEFAULT_MAX_SEGMENT_SIZE;
use mementokv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// MementoKV CLI
#[derive(Parser, Debug)]
#[command(name = "mementokv")]
#[command(about = "Log-structured key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./mementokv_data")]
    data_dir: String,

    /// Segment size in bytes at which the active segment is rotated
    #[arg(short = 's', long, default_value_t = DEFAULT_MAX_SEGMENT_SIZE)]
    max_segment_size: u64,

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
    Put {
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

    /// List live keys
    Keys,

    /// Show segments and recovery statistics
    Stats,

    /// Run the demonstration sequence of puts, gets and a delete
    Demo,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mementokv=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .max_segment_size(args.max_segment_size)
        .build();

    let mut engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut engine, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(engine: &mut Engine, command: Commands) -> mementokv::Result<()> {
    match command {
        Commands::Get { key } => print_value(engine.get(&key)?),
        Commands::Put { key, value } => {
            engine.put(&key, &value)?;
            println!("OK");
        }
        Commands::Del { key } => {
            engine.delete(&key)?;
            println!("OK");
        }
        Commands::Keys => {
            for key in engine.keys() {
                println!("{}", key);
            }
        }
        Commands::Stats => {
            let segments = engine.segment_ids()?;
            let recovery = engine.last_recovery();
            println!("data dir:           {}", engine.data_dir().display());
            println!("segments:           {}", segments.len());
            println!("active segment:     {}", engine.active_segment());
            println!("live keys:          {}", engine.len());
            println!("records indexed:    {}", recovery.records_indexed);
            println!("tombstones applied: {}", recovery.tombstones_applied);
            println!("records corrupted:  {}", recovery.records_corrupted);
            println!("truncated segments: {}", recovery.truncated_segments);
        }
        Commands::Demo => demo(engine)?,
    }

    Ok(())
}

/// The fixed put/get/delete sequence
fn demo(engine: &mut Engine) -> mementokv::Result<()> {
    let long_value = "0123456789".repeat(10) + "0123";

    engine.put("key1", &long_value)?;
    print_value(engine.get("key1")?);

    engine.put("key2", "second value")?;
    print_value(engine.get("key2")?);

    engine.put("key1", "first value overridden")?;
    print_value(engine.get("key1")?);

    engine.delete("key1")?;
    print_value(engine.get("key1")?);

    Ok(())
}

fn print_value(value: Option<String>) {
    match value {
        Some(v) => println!("{}", v),
        None => println!("(nil)"),
    }
}
