//! Contract round watcher binary
//!
//! Follows one aggregator contract's logs and maintains the latest-known
//! consensus round state, deduplicating redelivered logs across restarts.

use anyhow::{Context, Result};
use clap::Parser;
use roundwatch::config::parse_address;
use roundwatch::rpc::RpcClient;
use roundwatch::store::RocksConsumptionStore;
use roundwatch::tracker::ContractTracker;
use roundwatch::watcher::LogWatcher;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber;

/// Aggregator contract round watcher
#[derive(Parser)]
#[command(name = "roundwatch")]
#[command(about = "Track an aggregator contract's round-request and config logs")]
struct Args {
    /// RPC endpoint URL (e.g., https://eth.llamarpc.com)
    #[arg(short, long, default_value = "http://127.0.0.1:8545")]
    rpc_url: String,

    /// Aggregator contract address (hex, with or without 0x prefix)
    #[arg(short, long)]
    contract: String,

    /// Job identifier recorded on consumption markers
    #[arg(short, long, default_value_t = 0)]
    job_id: u32,

    /// Blocks re-scanned each pass to pick up reorged logs
    #[arg(long, default_value_t = 12)]
    confirmation_window: u64,

    /// Path to RocksDB database directory
    #[arg(short, long, default_value = "./tracker_db")]
    db_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let args = Args::parse();
    let contract = parse_address(&args.contract).context("Invalid contract address")?;

    info!("Starting contract round watcher");
    info!("RPC URL: {}", args.rpc_url);
    info!("Contract: {:?}", contract);
    info!("Database: {:?}", args.db_path);

    // Open the consumption-marker store
    let store = Arc::new(
        RocksConsumptionStore::open(&args.db_path)
            .with_context(|| format!("Failed to open database at {:?}", args.db_path))?,
    );

    // Tracker with a chain-query fallback for restarts
    let tracker = Arc::new(
        ContractTracker::new(
            contract,
            store.clone(),
            Some(RpcClient::new(args.rpc_url.clone())),
            args.job_id,
        )
        .context("Failed to create tracker")?,
    );

    // Delivery loop
    let watcher = LogWatcher::new(
        tracker,
        RpcClient::new(args.rpc_url),
        store,
        args.confirmation_window,
    );
    watcher
        .initialize()
        .await
        .context("Failed to initialize watcher")?;

    // Handle Ctrl+C gracefully
    tokio::select! {
        result = watcher.run() => {
            result.context("Watcher error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    info!("Watcher stopped");
    Ok(())
}
