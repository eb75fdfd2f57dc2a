//! EmberKV Server Binary
//!
//! Replays the AOF and starts the TCP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use emberkv::aof::AofRecovery;
use emberkv::config::AofSyncStrategy;
use emberkv::network::Server;
use emberkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// EmberKV Server
#[derive(Parser, Debug)]
#[command(name = "emberkv-server")]
#[command(about = "Key-value server with a Redis-compatible protocol")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./emberkv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// AOF file name inside the data directory
    #[arg(long, default_value = "appendonly.aof")]
    aof_file: String,

    /// fsync the AOF after this many appends (1 = every write)
    #[arg(long, default_value = "100")]
    fsync_every: usize,

    /// Check the AOF for corruption and exit without serving
    #[arg(long)]
    check_aof: bool,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,emberkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("EmberKV Server v{}", emberkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);

    let sync_strategy = match args.fsync_every {
        1 => AofSyncStrategy::EveryWrite,
        count => AofSyncStrategy::EveryNEntries { count },
    };

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .aof_filename(&args.aof_file)
        .aof_sync_strategy(sync_strategy)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .build();

    if args.check_aof {
        std::process::exit(check_aof(config.aof_path()));
    }

    // Open engine (replays the AOF before anything is accepted)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    let server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Verify the log and report; returns the process exit code
fn check_aof(path: PathBuf) -> i32 {
    match AofRecovery::verify(&path) {
        Ok(result) if result.was_truncated => {
            tracing::warn!(
                "{}: {} complete records, partial record after byte {}",
                path.display(),
                result.records_replayed,
                result.valid_len
            );
            1
        }
        Ok(result) => {
            tracing::info!(
                "{}: OK, {} records, {} bytes",
                path.display(),
                result.records_replayed,
                result.valid_len
            );
            0
        }
        Err(e) => {
            tracing::error!("{}: {}", path.display(), e);
            2
        }
    }
}
