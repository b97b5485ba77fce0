//! CLI implementation for logctl
//!
//! Provides a developer-friendly command-line interface for inspecting
//! the consumption-marker store. All commands output pretty JSON.

use crate::config::{parse_address, parse_hash};
use crate::store::{ConsumptionRecord, ConsumptionStore, RocksConsumptionStore};
use crate::types::LogIdentity;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

/// Consumption-marker store CLI tool
#[derive(Parser)]
#[command(name = "logctl")]
#[command(about = "Inspect the consumed-log marker store")]
pub struct Cli {
    /// Path to the RocksDB database directory
    #[arg(short, long, default_value = "./tracker_db")]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get the delivery cursor (last scanned block)
    GetCursor,
    /// Set the delivery cursor
    SetCursor {
        /// Block number
        block: u64,
    },
    /// Check whether a log has been consumed
    CheckLog {
        /// Block hash in hex (64 hex chars, with or without 0x prefix)
        block_hash: String,
        /// Index of the log within its block
        log_index: u64,
    },
    /// Mark a log consumed by hand
    MarkLog {
        /// Block hash in hex (64 hex chars, with or without 0x prefix)
        block_hash: String,
        /// Index of the log within its block
        log_index: u64,
        /// Number of the block the log was emitted in
        block_number: u64,
        /// Job identifier to record on the marker
        #[arg(default_value_t = 0)]
        job_id: u32,
    },
    /// Decode-check an address argument (sanity helper for scripts)
    ParseAddress {
        /// Contract address in hex (with or without 0x prefix)
        address: String,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = RocksConsumptionStore::open(&cli.db_path)
        .with_context(|| format!("Failed to open database at {:?}", cli.db_path))?;

    match cli.command {
        Commands::GetCursor => {
            let cursor = store.get_cursor()?;
            println!("{}", serde_json::to_string_pretty(&json!({ "cursor": cursor }))?);
        }
        Commands::SetCursor { block } => {
            store.set_cursor(block)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "status": "ok", "cursor": block }))?
            );
        }
        Commands::CheckLog {
            block_hash,
            log_index,
        } => {
            let id = LogIdentity {
                block_hash: parse_hash(&block_hash)?,
                log_index,
            };
            let record = store.get_consumption(&id)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "consumed": record.is_some(),
                    "record": record.map(|r| json!({
                        "block_number": r.block_number,
                        "job_id": r.job_id,
                    })),
                }))?
            );
        }
        Commands::MarkLog {
            block_hash,
            log_index,
            block_number,
            job_id,
        } => {
            let id = LogIdentity {
                block_hash: parse_hash(&block_hash)?,
                log_index,
            };
            let record = ConsumptionRecord {
                block_number,
                job_id,
            };
            store.mark_consumed(&id, &record)?;
            println!("{}", serde_json::to_string_pretty(&json!({ "status": "ok" }))?);
        }
        Commands::ParseAddress { address } => {
            let addr = parse_address(&address)?;
            println!(
                "{}",
                serde_json::to_string_pretty(
                    &json!({ "address": format!("0x{}", hex::encode(addr.as_slice())) })
                )?
            );
        }
    }

    Ok(())
}
